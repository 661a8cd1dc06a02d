// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `SystemConfig`: a namespaced key/value store with lazily-materialized
//! defaults. Keys look like `quarantine.auto_approve_clean` or
//! `training.max_memory_pct`; the namespace is everything before the last
//! dot when one is present.

use std::collections::HashMap;

use serde_json::Value;

/// A key's default, registered once per namespace at startup. Reads for a
/// key with no stored row fall back to this; the row materializes (is
/// written back) only when explicitly set.
#[derive(Debug, Clone)]
pub struct ConfigDefault {
    pub key: &'static str,
    pub value: Value,
}

/// In-memory view over config rows, with a default table consulted on miss.
/// The persisted copy lives in `vault-storage`; this type is the pure
/// merge-and-lookup logic shared by every reader.
#[derive(Debug, Clone, Default)]
pub struct SystemConfig {
    stored: HashMap<String, Value>,
    defaults: HashMap<&'static str, Value>,
}

impl SystemConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: impl IntoIterator<Item = ConfigDefault>) -> Self {
        let mut config = Self::new();
        for default in defaults {
            config.defaults.insert(default.key, default.value);
        }
        config
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.stored.insert(key.into(), value);
    }

    /// Returns the stored value, the registered default, or `None` if
    /// neither exists.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.stored.get(key).or_else(|| self.defaults.get(key))
    }

    pub fn get_bool(&self, key: &str, fallback: bool) -> bool {
        self.get(key).and_then(Value::as_bool).unwrap_or(fallback)
    }

    pub fn get_str<'a>(&'a self, key: &str, fallback: &'a str) -> &'a str {
        self.get(key).and_then(Value::as_str).unwrap_or(fallback)
    }

    pub fn get_f64(&self, key: &str, fallback: f64) -> f64 {
        self.get(key).and_then(Value::as_f64).unwrap_or(fallback)
    }

    pub fn get_u64(&self, key: &str, fallback: u64) -> u64 {
        self.get(key).and_then(Value::as_u64).unwrap_or(fallback)
    }

    /// All stored keys (not defaults) under a namespace prefix, e.g. all of
    /// `quarantine.*`.
    pub fn namespace(&self, prefix: &str) -> impl Iterator<Item = (&str, &Value)> {
        let needle = format!("{prefix}.");
        self.stored
            .iter()
            .filter(move |(k, _)| k.starts_with(&needle))
            .map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
