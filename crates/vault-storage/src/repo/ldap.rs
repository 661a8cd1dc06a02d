// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed row ↔ domain mapping for `ldap_group_mappings`.

use sqlx::{Row, SqlitePool};
use vault_core::ids::LdapGroupMappingId;
use vault_core::ldap::LdapGroupMapping;
use vault_core::user::Role;

use crate::StorageError;

fn role_to_str(r: Role) -> &'static str {
    match r {
        Role::Admin => "admin",
        Role::User => "user",
    }
}

fn role_from_str(s: &str) -> Result<Role, StorageError> {
    Ok(match s {
        "admin" => Role::Admin,
        "user" => Role::User,
        other => return Err(StorageError::Decode(format!("unknown role {other}"))),
    })
}

fn row_to_mapping(row: &sqlx::sqlite::SqliteRow) -> Result<LdapGroupMapping, StorageError> {
    Ok(LdapGroupMapping {
        id: LdapGroupMappingId::new(row.try_get::<String, _>("id")?),
        directory_group_identifier: row.try_get("directory_group_identifier")?,
        role: role_from_str(row.try_get::<String, _>("role")?.as_str())?,
        priority: row.try_get("priority")?,
    })
}

pub async fn insert(pool: &SqlitePool, mapping: &LdapGroupMapping) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO ldap_group_mappings (id, directory_group_identifier, role, priority) VALUES (?,?,?,?)",
    )
    .bind(mapping.id.as_str())
    .bind(&mapping.directory_group_identifier)
    .bind(role_to_str(mapping.role))
    .bind(mapping.priority)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn all(pool: &SqlitePool) -> Result<Vec<LdapGroupMapping>, StorageError> {
    let rows = sqlx::query("SELECT * FROM ldap_group_mappings ORDER BY priority DESC")
        .fetch_all(pool)
        .await?;
    rows.iter().map(row_to_mapping).collect()
}

#[cfg(test)]
#[path = "ldap_tests.rs"]
mod tests;
