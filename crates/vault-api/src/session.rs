// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stateless, signed bearer session tokens. A token is
//! `base64(user_id.role.expires_at_unix)` followed by `.` and a hex
//! HMAC-SHA256 tag over that payload, so verification never touches
//! storage — only API-key auth does.

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use vault_core::user::Role;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_TTL: Duration = Duration::hours(12);

#[derive(Debug, Clone, PartialEq)]
pub struct SessionClaims {
    pub user_id: String,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("malformed session token")]
    Malformed,
    #[error("session token signature is invalid")]
    BadSignature,
    #[error("session token has expired")]
    Expired,
}

fn role_tag(role: Role) -> &'static str {
    match role {
        Role::Admin => "admin",
        Role::User => "user",
    }
}

fn role_from_tag(tag: &str) -> Result<Role, SessionError> {
    match tag {
        "admin" => Ok(Role::Admin),
        "user" => Ok(Role::User),
        _ => Err(SessionError::Malformed),
    }
}

fn sign(secret: &[u8], payload: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("hmac accepts keys of any length");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

pub fn issue(secret: &[u8], user_id: &str, role: Role, now: DateTime<Utc>) -> String {
    let expires_at = now + SESSION_TTL;
    let payload = format!("{user_id}.{}.{}", role_tag(role), expires_at.timestamp());
    let encoded = base64::Engine::encode(&base64::engine::general_purpose::STANDARD, payload.as_bytes());
    let signature = sign(secret, &encoded);
    format!("{encoded}.{signature}")
}

pub fn verify(secret: &[u8], token: &str, now: DateTime<Utc>) -> Result<SessionClaims, SessionError> {
    let (encoded, signature) = token.split_once('.').ok_or(SessionError::Malformed)?;
    let expected = sign(secret, encoded);
    if !constant_time_eq(expected.as_bytes(), signature.as_bytes()) {
        return Err(SessionError::BadSignature);
    }

    let payload_bytes = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, encoded)
        .map_err(|_| SessionError::Malformed)?;
    let payload = String::from_utf8(payload_bytes).map_err(|_| SessionError::Malformed)?;
    let mut parts = payload.splitn(3, '.');
    let user_id = parts.next().ok_or(SessionError::Malformed)?.to_string();
    let role = role_from_tag(parts.next().ok_or(SessionError::Malformed)?)?;
    let expires_at_unix: i64 = parts
        .next()
        .ok_or(SessionError::Malformed)?
        .parse()
        .map_err(|_| SessionError::Malformed)?;
    let expires_at = DateTime::from_timestamp(expires_at_unix, 0).ok_or(SessionError::Malformed)?;

    if now > expires_at {
        return Err(SessionError::Expired);
    }

    Ok(SessionClaims { user_id, role, expires_at })
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
