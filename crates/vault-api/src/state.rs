// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The wiring-together of every subsystem crate into the single state
//! object axum handlers read from. Constructed once per process by
//! `vault-daemon`; cheap to `Clone` since every field is an `Arc` or a
//! pool handle that is itself reference-counted.

use std::sync::Arc;

use parking_lot::RwLock;
use sqlx::SqlitePool;
use vault_adapters::gpu_probe::NvidiaSmiProbe;
use vault_core::id::UuidIdGen;
use vault_ops::adapters::AdapterManager;
use vault_ops::service_manager::SystemdServiceManager;
use vault_ops::uptime_monitor::UptimeMonitor;
use vault_quarantine::config::QuarantineConfig;
use vault_quarantine::pipeline::PipelineDriver;
use vault_scheduler::gpu::GpuScheduler;
use vault_scheduler::runner::JobRunner;
use vault_scheduler::sink::WorkloadStatusSink;
use vault_update::engine::UpdatePaths;

use crate::restarter::HttpHealthRestarter;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub session_secret: Arc<Vec<u8>>,
    pub gpu: Arc<GpuScheduler<NvidiaSmiProbe>>,
    pub runner: Arc<JobRunner<WorkloadStatusSink>>,
    pub adapter_manager: Arc<AdapterManager<HttpHealthRestarter>>,
    pub service_manager: Arc<SystemdServiceManager>,
    pub uptime_monitor: Arc<UptimeMonitor<SystemdServiceManager>>,
    pub quarantine: Arc<RwLock<QuarantineConfig>>,
    /// Built once at process start from the `quarantine` config snapshot
    /// above; a config edit through the admin endpoint takes effect on
    /// the next daemon restart rather than live.
    pub quarantine_pipeline: Arc<PipelineDriver>,
    pub update_paths: Arc<UpdatePaths>,
    pub http_client: reqwest::Client,
    pub inference_base_url: Arc<str>,
    pub id_gen: UuidIdGen,
}
