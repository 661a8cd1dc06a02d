// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Polls the service manager every 30 s, tracks each service's last known
//! state, and emits `UptimeEvent`s on transition. The availability math
//! itself lives in `vault_core::uptime`; this module only owns the poll
//! loop and the state-transition bookkeeping.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::Utc;
use sqlx::SqlitePool;
use vault_core::ids::UptimeEventId;
use vault_core::uptime::UptimeEvent;
use vault_storage::repo::uptime_events;

use crate::service_manager::{RunState, ServiceManager, ALLOWLIST};

pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LastState {
    Up,
    Down,
    Unknown,
}

impl From<RunState> for LastState {
    fn from(state: RunState) -> Self {
        match state {
            RunState::Running => LastState::Up,
            RunState::Stopped => LastState::Down,
            RunState::Unavailable => LastState::Unknown,
        }
    }
}

pub struct UptimeMonitor<M: ServiceManager> {
    manager: M,
    pool: SqlitePool,
    last_state: Mutex<HashMap<String, LastState>>,
}

impl<M: ServiceManager> UptimeMonitor<M> {
    /// Seeds every allowlisted service at `unknown` with no event recorded,
    /// matching the "seeded on start with a single check that records no
    /// events" contract.
    pub fn new(manager: M, pool: SqlitePool) -> Self {
        let last_state = ALLOWLIST.iter().map(|name| (name.to_string(), LastState::Unknown)).collect();
        Self {
            manager,
            pool,
            last_state: Mutex::new(last_state),
        }
    }

    /// Runs one poll cycle over the allowlist, writing any state-transition
    /// events to storage. Returns the number of events written.
    pub async fn poll_once(&self, event_ids: &mut impl Iterator<Item = UptimeEventId>) -> usize {
        let mut written = 0;
        for name in ALLOWLIST {
            let status = self.manager.status(name).await;
            let new_state = match status {
                Ok(s) => LastState::from(s.state),
                Err(_) => LastState::Unknown,
            };
            let previous = {
                let mut guard = self.last_state.lock().unwrap_or_else(|e| e.into_inner());
                let previous = *guard.get(*name).unwrap_or(&LastState::Unknown);
                guard.insert(name.to_string(), new_state);
                previous
            };

            if previous == new_state {
                continue;
            }
            let Some(event_id) = event_ids.next() else { break };
            if self.record_transition(name, previous, new_state, event_id).await {
                written += 1;
            }
        }
        written
    }

    async fn record_transition(
        &self,
        name: &str,
        previous: LastState,
        new_state: LastState,
        event_id: UptimeEventId,
    ) -> bool {
        let now = Utc::now();
        match (previous, new_state) {
            (LastState::Up, LastState::Down) => {
                let event = UptimeEvent::down(event_id, name, now);
                uptime_events::insert(&self.pool, &event).await.is_ok()
            }
            (LastState::Down, LastState::Up) => {
                let duration = self.open_down_duration(name, now).await;
                let _ = uptime_events::close_open_down(&self.pool, name, duration).await;
                let event = UptimeEvent::up(event_id, name, now, duration);
                uptime_events::insert(&self.pool, &event).await.is_ok()
            }
            _ => false,
        }
    }

    /// Duration in seconds the most recent still-open `down` event for
    /// `name` has been open, computed before it is stamped closed.
    async fn open_down_duration(&self, name: &str, now: chrono::DateTime<Utc>) -> f64 {
        match uptime_events::for_service(&self.pool, name, now - chrono::Duration::days(30)).await {
            Ok(events) => events
                .iter()
                .rev()
                .find(|e| {
                    matches!(e.event_type, vault_core::uptime::UptimeEventType::Down) && e.duration_seconds.is_none()
                })
                .map(|e| (now - e.timestamp).num_milliseconds() as f64 / 1000.0)
                .unwrap_or(0.0),
            Err(_) => 0.0,
        }
    }
}

#[cfg(test)]
#[path = "uptime_monitor_tests.rs"]
mod tests;
