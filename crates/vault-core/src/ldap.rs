// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Directory-group-to-role mappings used for JIT provisioning of directory
//! users on first successful bind.

use serde::{Deserialize, Serialize};

use crate::ids::LdapGroupMappingId;
use crate::user::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LdapGroupMapping {
    pub id: LdapGroupMappingId,
    pub directory_group_identifier: String,
    pub role: Role,
    pub priority: i32,
}

/// Resolves the role for a user who is a member of `groups`, by picking the
/// mapping with the highest `priority` among matches. Returns `None` when
/// no mapping matches (caller decides the provisioning default).
pub fn resolve_role<'a>(
    mappings: impl IntoIterator<Item = &'a LdapGroupMapping>,
    groups: &[String],
) -> Option<Role> {
    mappings
        .into_iter()
        .filter(|m| groups.iter().any(|g| g == &m.directory_group_identifier))
        .max_by_key(|m| m.priority)
        .map(|m| m.role)
}

#[cfg(test)]
#[path = "ldap_tests.rs"]
mod tests;
