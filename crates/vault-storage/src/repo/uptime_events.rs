// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed row ↔ domain mapping for `uptime_events`.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use vault_core::ids::UptimeEventId;
use vault_core::uptime::{UptimeEvent, UptimeEventType};

use crate::StorageError;

fn type_to_str(t: UptimeEventType) -> &'static str {
    match t {
        UptimeEventType::Up => "up",
        UptimeEventType::Down => "down",
    }
}

fn type_from_str(s: &str) -> Result<UptimeEventType, StorageError> {
    Ok(match s {
        "up" => UptimeEventType::Up,
        "down" => UptimeEventType::Down,
        other => return Err(StorageError::Decode(format!("unknown uptime event type {other}"))),
    })
}

fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> Result<UptimeEvent, StorageError> {
    Ok(UptimeEvent {
        id: UptimeEventId::new(row.try_get::<String, _>("id")?),
        service_name: row.try_get("service_name")?,
        event_type: type_from_str(row.try_get::<String, _>("event_type")?.as_str())?,
        timestamp: row.try_get("timestamp")?,
        duration_seconds: row.try_get("duration_seconds")?,
        details: row.try_get("details")?,
    })
}

pub async fn insert(pool: &SqlitePool, event: &UptimeEvent) -> Result<(), StorageError> {
    sqlx::query(
        "INSERT INTO uptime_events (id, service_name, event_type, timestamp, duration_seconds, details)
         VALUES (?,?,?,?,?,?)",
    )
    .bind(event.id.as_str())
    .bind(&event.service_name)
    .bind(type_to_str(event.event_type))
    .bind(event.timestamp)
    .bind(event.duration_seconds)
    .bind(&event.details)
    .execute(pool)
    .await?;
    Ok(())
}

/// Fills in `duration_seconds` on the most recent still-open `down` event
/// for `service_name`, used when a matching `up` transition arrives.
pub async fn close_open_down(
    pool: &SqlitePool,
    service_name: &str,
    duration_seconds: f64,
) -> Result<Option<UptimeEventId>, StorageError> {
    let row = sqlx::query(
        "SELECT id FROM uptime_events WHERE service_name = ? AND event_type = 'down'
         AND duration_seconds IS NULL ORDER BY timestamp DESC LIMIT 1",
    )
    .bind(service_name)
    .fetch_optional(pool)
    .await?;
    let Some(row) = row else { return Ok(None) };
    let id: String = row.try_get("id")?;
    sqlx::query("UPDATE uptime_events SET duration_seconds = ? WHERE id = ?")
        .bind(duration_seconds)
        .bind(&id)
        .execute(pool)
        .await?;
    Ok(Some(UptimeEventId::new(id)))
}

pub async fn for_service(
    pool: &SqlitePool,
    service_name: &str,
    since: DateTime<Utc>,
) -> Result<Vec<UptimeEvent>, StorageError> {
    let rows = sqlx::query(
        "SELECT * FROM uptime_events WHERE service_name = ? AND timestamp >= ? ORDER BY timestamp",
    )
    .bind(service_name)
    .bind(since)
    .fetch_all(pool)
    .await?;
    rows.iter().map(row_to_event).collect()
}

#[cfg(test)]
#[path = "uptime_events_tests.rs"]
mod tests;
