// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One module per entity, each a thin typed wrapper over `sqlx::query` —
//! no ORM, matching the teacher's preference for explicit row mapping over
//! a query-building abstraction layer.

pub mod adapters;
pub mod audit_log;
pub mod eval_jobs;
pub mod ldap;
pub mod quarantine;
pub mod system_config;
pub mod training_jobs;
pub mod update_jobs;
pub mod uptime_events;
pub mod users;
