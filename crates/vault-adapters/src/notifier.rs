// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured log-event fan-out. The `/ws/logs` endpoint and any other
//! in-process subscriber attach here rather than tailing a file; the
//! appliance is air-gapped, so there is no desktop or push notification
//! surface, only this internal broadcast.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    pub at: DateTime<Utc>,
    pub level: LogLevel,
    pub source: String,
    pub message: String,
}

/// In-process broadcaster for the operator log stream. A slow or absent
/// subscriber never blocks emission; `broadcast` drops the oldest
/// buffered entries for a lagging receiver instead.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<LogEvent>,
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.tx.subscribe()
    }

    /// Emits an event. Returns the number of active subscribers, which
    /// is informational only; zero subscribers is not an error.
    pub fn emit(&self, level: LogLevel, source: impl Into<String>, message: impl Into<String>) -> usize {
        let event = LogEvent {
            at: Utc::now(),
            level,
            source: source.into(),
            message: message.into(),
        };
        self.tx.send(event).unwrap_or(0)
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "notifier_tests.rs"]
mod tests;
