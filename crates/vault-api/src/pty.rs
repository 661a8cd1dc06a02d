// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interactive subprocess bridge backing `/ws/terminal` and `/ws/python`.
//!
//! A real PTY (session leader, controlling terminal, `TIOCSWINSZ`) needs
//! `unsafe` — `CommandExt::pre_exec` and the raw ioctl are both `unsafe
//! fn` — which this workspace forbids outright (`unsafe_code = "forbid"`
//! in the workspace lints). So this bridges the child's stdin/stdout/
//! stderr pipes directly instead of a pty: no line discipline, no job
//! control signals, and a resize message only changes what the two sides
//! agree the terminal dimensions are (`COLUMNS`/`LINES` env, set at spawn
//! time) rather than a live `ioctl`.

use std::io;
use std::process::Stdio;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, ChildStdout};

pub struct PtySession {
    pub(crate) child: Child,
    stdin: ChildStdin,
    pub(crate) stdout: ChildStdout,
}

impl PtySession {
    pub fn spawn(program: &str, args: &[&str], cols: u16, rows: u16) -> io::Result<Self> {
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .env("COLUMNS", cols.to_string())
            .env("LINES", rows.to_string())
            .env("TERM", "xterm-256color")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child.stdin.take().ok_or_else(|| io::Error::other("child stdin not piped"))?;
        let stdout = child.stdout.take().ok_or_else(|| io::Error::other("child stdout not piped"))?;

        Ok(PtySession { child, stdin, stdout })
    }

    pub async fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stdout.read(buf).await
    }

    pub async fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.stdin.write_all(buf).await
    }

    /// No-op: without a controlling terminal there is no kernel-side window
    /// size to update. Kept so the WS handler's resize frame has somewhere
    /// to go; a future real-pty implementation would wire this to
    /// `TIOCSWINSZ`.
    pub fn resize(&self, _cols: u16, _rows: u16) -> io::Result<()> {
        Ok(())
    }

    pub async fn wait(&mut self) -> io::Result<std::process::ExitStatus> {
        self.child.wait().await
    }

    pub fn kill(&mut self) {
        let _ = self.child.start_kill();
    }
}
