// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Result-typed admission control. Replaces exception-driven "deny by
//! raising" control flow: a caller evaluating whether an action may
//! proceed gets back a value describing the decision and, on denial, the
//! reason, rather than a `Result` whose `Err` variant is used for a
//! perfectly ordinary "no".

use std::fmt;

/// The outcome of an admission check (GPU acquisition, quarantine
/// submission caps, update-apply mutual exclusion, …). `allowed=false`
/// always carries a `reason`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl AdmissionDecision {
    pub fn allow() -> Self {
        AdmissionDecision {
            allowed: true,
            reason: None,
        }
    }

    pub fn deny(reason: impl Into<String>) -> Self {
        AdmissionDecision {
            allowed: false,
            reason: Some(reason.into()),
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Converts a denial into a `CoreError::conflict`; panics (via `debug_assert`)
    /// if called on an allowed decision, since that would indicate a caller bug.
    pub fn into_conflict(self) -> Option<crate::error::CoreError> {
        if self.allowed {
            None
        } else {
            Some(crate::error::CoreError::conflict(
                self.reason.unwrap_or_else(|| "admission denied".to_string()),
            ))
        }
    }
}

impl fmt::Display for AdmissionDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.allowed, &self.reason) {
            (true, _) => write!(f, "allowed"),
            (false, Some(reason)) => write!(f, "denied: {reason}"),
            (false, None) => write!(f, "denied"),
        }
    }
}

#[cfg(test)]
#[path = "admission_tests.rs"]
mod tests;
