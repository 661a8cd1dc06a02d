// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers shared by every collaborator that shells
//! out to a local tool rather than talking to it over a socket.

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Default timeout for a GPU topology probe (`nvidia-smi`-equivalent).
pub const GPU_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default timeout for the portable "is this service running" check used
/// by the service manager on platforms without a socket-based probe.
pub const SERVICE_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for signature-bundle install helper commands (e.g.
/// verifying an archive member's magic bytes via an external tool).
pub const SIGNATURE_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`, converting
/// timeout expiration into a descriptive error message. The child process
/// is killed automatically if the timeout elapses (via the tokio `Child`
/// drop implementation).
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{} failed: {}", description, io_err)),
        Err(_elapsed) => Err(format!(
            "{} timed out after {}s",
            description,
            timeout.as_secs()
        )),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
