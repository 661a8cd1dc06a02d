// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Detached-signature verification against a pinned ed25519 public key.
//! Both the signature file and the key file are required on disk; absence
//! of either is a hard failure, never a soft pass.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use thiserror::Error;

const ARMOR_BEGIN: &str = "-----BEGIN VAULT SIGNATURE-----";
const ARMOR_END: &str = "-----END VAULT SIGNATURE-----";

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("failed to read archive or signature file: {0}")]
    Io(#[from] std::io::Error),
    #[error("signature file is not ASCII-armored with the expected header/footer")]
    Armor,
    #[error("signature body is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("signature is not a valid 64-byte ed25519 signature")]
    MalformedSignature,
    #[error("public key file is not a valid 32-byte ed25519 public key")]
    MalformedKey,
    #[error("signature verification failed: the bundle is not authentic")]
    VerificationFailed,
}

fn strip_armor(armored: &str) -> Result<String, SignatureError> {
    let begin = armored.find(ARMOR_BEGIN).ok_or(SignatureError::Armor)?;
    let end = armored.find(ARMOR_END).ok_or(SignatureError::Armor)?;
    if end <= begin {
        return Err(SignatureError::Armor);
    }
    let body = &armored[begin + ARMOR_BEGIN.len()..end];
    Ok(body.chars().filter(|c| !c.is_whitespace()).collect())
}

/// Verifies `archive_path`'s bytes against `signature_path` (ASCII-armored,
/// base64 inner body) using the ed25519 public key at `public_key_path`
/// (raw 32 bytes, base64-encoded).
pub fn verify_detached_signature(
    archive_path: &Path,
    signature_path: &Path,
    public_key_path: &Path,
) -> Result<(), SignatureError> {
    let archive_bytes = std::fs::read(archive_path)?;
    let armored = std::fs::read_to_string(signature_path)?;
    let key_encoded = std::fs::read_to_string(public_key_path)?;

    let signature_body = strip_armor(&armored)?;
    let signature_bytes = BASE64.decode(signature_body.as_bytes())?;
    let signature_array: [u8; 64] = signature_bytes
        .as_slice()
        .try_into()
        .map_err(|_| SignatureError::MalformedSignature)?;
    let signature = Signature::from_bytes(&signature_array);

    let key_bytes = BASE64
        .decode(key_encoded.trim().as_bytes())
        .map_err(|_| SignatureError::MalformedKey)?;
    let key_array: [u8; 32] = key_bytes.as_slice().try_into().map_err(|_| SignatureError::MalformedKey)?;
    let verifying_key = VerifyingKey::from_bytes(&key_array).map_err(|_| SignatureError::MalformedKey)?;

    verifying_key
        .verify(&archive_bytes, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}

#[cfg(test)]
#[path = "signature_tests.rs"]
mod tests;
