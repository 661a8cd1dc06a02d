// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! User accounts and API keys.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ApiKeyId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserStatus {
    Active,
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthSource {
    Local,
    Directory,
}

/// A user account, local or directory-backed.
///
/// Invariant: `auth_source == Local` implies `credential_hash` is set;
/// `auth_source == Directory` implies `directory_dn` is set. Constructors
/// enforce this; there is no way to build a `User` that violates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub auth_source: AuthSource,
    pub credential_hash: Option<String>,
    pub directory_dn: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_active: Option<DateTime<Utc>>,
}

/// Error returned when constructing a `User` whose fields violate the
/// auth-source invariant.
#[derive(Debug, thiserror::Error)]
pub enum UserInvariantError {
    #[error("local auth source requires a credential hash")]
    MissingCredentialHash,
    #[error("directory auth source requires a directory DN")]
    MissingDirectoryDn,
}

impl User {
    pub fn new_local(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        credential_hash: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        User {
            id,
            name: name.into(),
            email: email.into(),
            role,
            status: UserStatus::Active,
            auth_source: AuthSource::Local,
            credential_hash: Some(credential_hash.into()),
            directory_dn: None,
            created_at,
            last_active: None,
        }
    }

    pub fn new_directory(
        id: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
        directory_dn: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        User {
            id,
            name: name.into(),
            email: email.into(),
            role,
            status: UserStatus::Active,
            auth_source: AuthSource::Directory,
            credential_hash: None,
            directory_dn: Some(directory_dn.into()),
            created_at,
            last_active: None,
        }
    }

    /// Validates the auth-source invariant; used when hydrating a row from
    /// storage, where the two constructors above cannot be relied on.
    pub fn check_invariant(&self) -> Result<(), UserInvariantError> {
        match self.auth_source {
            AuthSource::Local if self.credential_hash.is_none() => {
                Err(UserInvariantError::MissingCredentialHash)
            }
            AuthSource::Directory if self.directory_dn.is_none() => {
                Err(UserInvariantError::MissingDirectoryDn)
            }
            _ => Ok(()),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, UserStatus::Active)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiKeyScope {
    User,
    Admin,
}

/// An API key row. The raw key is returned only at creation time by the
/// service layer; this type stores the hash and a display prefix only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKey {
    pub id: ApiKeyId,
    pub key_hash: String,
    pub key_prefix: String,
    pub label: String,
    pub scope: ApiKeyScope,
    pub is_active: bool,
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl ApiKey {
    /// Prefix length used for display (`key_prefix` stores at least this
    /// many leading characters of the raw key, never the full key).
    pub const PREFIX_LEN: usize = 12;
}

#[cfg(test)]
#[path = "user_tests.rs"]
mod tests;
