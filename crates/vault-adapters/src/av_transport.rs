// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `zINSTREAM` command protocol for the antivirus daemon, spoken over a
//! local Unix domain socket. Per scan: write the literal null-terminated
//! `zINSTREAM\0` header, then repeatedly send `(length: u32 big-endian,
//! chunk)` frames ending with a zero-length frame, then read the
//! response up to a null terminator.
//!
//! Any I/O failure (daemon not installed, socket refused) is a soft
//! `Unavailable` — never surfaced as a hold, since the quarantine stage
//! treats an absent AV daemon as an informational finding rather than a
//! blocking one. A reachable daemon that returns a reply this client
//! cannot parse is a distinct `Error`: that is a protocol bug, not an
//! absent daemon, and must not be folded into the same soft pass.

use std::path::Path;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;

const CHUNK_SIZE: usize = 64 * 1024;
const MAX_RESPONSE_BYTES: usize = 4096;

/// The command clamd expects to begin a streaming scan. Sent verbatim,
/// with no trailing newline — the null byte is the frame terminator.
const INSTREAM_COMMAND: &[u8] = b"zINSTREAM\0";

#[derive(Debug, Clone, PartialEq)]
pub enum ScanVerdict {
    Clean,
    Infected { threat_name: String },
    /// The daemon was reachable but replied with something this client
    /// could not parse as either `OK` or `FOUND`.
    Error { detail: String },
    Unavailable,
}

/// Speaks the `zINSTREAM` protocol against a daemon listening on
/// `socket_path`.
pub async fn scan_file(socket_path: &Path, data: &[u8]) -> ScanVerdict {
    match scan_file_inner(socket_path, data).await {
        Ok(verdict) => verdict,
        Err(_) => ScanVerdict::Unavailable,
    }
}

async fn scan_file_inner(socket_path: &Path, data: &[u8]) -> std::io::Result<ScanVerdict> {
    let mut stream = UnixStream::connect(socket_path).await?;

    stream.write_all(INSTREAM_COMMAND).await?;

    for chunk in data.chunks(CHUNK_SIZE) {
        stream.write_all(&(chunk.len() as u32).to_be_bytes()).await?;
        stream.write_all(chunk).await?;
    }
    stream.write_all(&0u32.to_be_bytes()).await?;

    let mut response = Vec::new();
    let mut byte = [0u8; 1];
    loop {
        if response.len() >= MAX_RESPONSE_BYTES {
            break;
        }
        let n = stream.read(&mut byte).await?;
        if n == 0 || byte[0] == 0 {
            break;
        }
        response.push(byte[0]);
    }

    Ok(parse_response(&response))
}

/// clamd replies to `INSTREAM` with `"stream: OK"` or
/// `"stream: <ThreatName> FOUND"`. Anything else reachable is a protocol
/// mismatch, surfaced as [`ScanVerdict::Error`] rather than silently
/// treated the same as a missing daemon.
fn parse_response(bytes: &[u8]) -> ScanVerdict {
    let text = String::from_utf8_lossy(bytes);
    let text = text.trim();

    if text.contains("FOUND") {
        let threat_name = text
            .split_once(':')
            .map(|(_, rest)| rest)
            .unwrap_or(text)
            .replace("FOUND", "")
            .trim()
            .to_string();
        return ScanVerdict::Infected {
            threat_name: if threat_name.is_empty() { "unknown".to_string() } else { threat_name },
        };
    }
    if text.contains("OK") {
        return ScanVerdict::Clean;
    }
    ScanVerdict::Error {
        detail: if text.is_empty() { "empty reply".to_string() } else { text.to_string() },
    }
}

#[cfg(test)]
#[path = "av_transport_tests.rs"]
mod tests;
