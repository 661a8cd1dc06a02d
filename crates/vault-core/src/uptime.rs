// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Uptime event records and availability-window accounting.
//!
//! The poller that produces these events lives in `vault-ops`; this module
//! owns the record shape and the pure availability arithmetic, which has no
//! dependency on wall-clock time beyond the `now` the caller supplies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UptimeEventId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UptimeEventType {
    Up,
    Down,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UptimeEvent {
    pub id: UptimeEventId,
    pub service_name: String,
    pub event_type: UptimeEventType,
    pub timestamp: DateTime<Utc>,
    pub duration_seconds: Option<f64>,
    pub details: Option<String>,
}

impl UptimeEvent {
    pub fn down(id: UptimeEventId, service_name: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        UptimeEvent {
            id,
            service_name: service_name.into(),
            event_type: UptimeEventType::Down,
            timestamp,
            duration_seconds: None,
            details: None,
        }
    }

    pub fn up(
        id: UptimeEventId,
        service_name: impl Into<String>,
        timestamp: DateTime<Utc>,
        duration_seconds: f64,
    ) -> Self {
        UptimeEvent {
            id,
            service_name: service_name.into(),
            event_type: UptimeEventType::Up,
            timestamp,
            duration_seconds: Some(duration_seconds),
            details: None,
        }
    }
}

/// Given a service's event history, compute the availability percentage
/// over the trailing `window_hours`, rounded to 4 decimal places.
///
/// Still-open `down` events (no matching `up` yet) are treated as open
/// through `now`. A service with no events in the window is fully
/// available (`100.0`), matching the "unknown service" case.
pub fn availability_pct(events: &[UptimeEvent], window_hours: f64, now: DateTime<Utc>) -> f64 {
    let window_seconds = window_hours * 3600.0;
    let window_start = now - chrono::Duration::seconds(window_seconds as i64);

    let mut total_downtime = 0.0;
    for event in events {
        if event.event_type != UptimeEventType::Down {
            continue;
        }
        if event.timestamp < window_start {
            continue;
        }
        let end = match event.duration_seconds {
            Some(secs) => event.timestamp + chrono::Duration::seconds(secs as i64),
            None => now,
        };
        let clipped_end = end.min(now);
        let downtime = (clipped_end - event.timestamp).num_milliseconds() as f64 / 1000.0;
        total_downtime += downtime.max(0.0);
    }

    if window_seconds <= 0.0 {
        return 100.0;
    }
    let pct = 100.0 * (1.0 - total_downtime / window_seconds);
    round4(pct.clamp(0.0, 100.0))
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
#[path = "uptime_tests.rs"]
mod tests;
