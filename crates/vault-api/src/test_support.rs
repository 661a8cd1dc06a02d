// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared `AppState` fixture for route-level integration tests, wiring an
//! in-memory database against the same concrete types the daemon uses in
//! production (minus the external processes: GPU probing, `systemctl`,
//! and the inference health check all degrade harmlessly with nothing
//! behind them).

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use vault_adapters::gpu_probe::NvidiaSmiProbe;
use vault_adapters::rule_matcher::FileBackedRuleMatcher;
use vault_core::id::UuidIdGen;
use vault_ops::adapters::AdapterManager;
use vault_ops::service_manager::SystemdServiceManager;
use vault_ops::uptime_monitor::UptimeMonitor;
use vault_quarantine::config::QuarantineConfig;
use vault_quarantine::hash_blacklist::HashBlacklist;
use vault_quarantine::pipeline::PipelineDriver;
use vault_quarantine::stage::Stage;
use vault_quarantine::stages::{
    AntivirusStage, ContentPolicyStage, HashBlacklistStage, RuleScanStage, SanitizationStage, SizeSniffStage,
};
use vault_scheduler::gpu::{GpuScheduler, GpuSchedulerConfig};
use vault_scheduler::runner::JobRunner;
use vault_scheduler::sink::WorkloadStatusSink;
use vault_update::engine::UpdatePaths;

use crate::restarter::HttpHealthRestarter;
use crate::state::AppState;

/// Builds an `AppState` backed by a fresh in-memory SQLite pool with
/// migrations applied. `session_secret` is fixed so tests can mint their
/// own tokens with [`crate::session::issue`].
pub async fn state() -> AppState {
    let pool = vault_storage::pool::open_in_memory()
        .await
        .expect("in-memory pool with migrations");

    let gpu = Arc::new(GpuScheduler::new(NvidiaSmiProbe, GpuSchedulerConfig::default()));
    let sink = Arc::new(WorkloadStatusSink::new(pool.clone(), Arc::clone(&gpu)));
    let runner = Arc::new(JobRunner::new(sink));

    let tmp = std::env::temp_dir().join(format!("vault-api-test-{}", uuid_like()));
    std::fs::create_dir_all(&tmp).expect("test tempdir");

    let adapter_manager = Arc::new(AdapterManager::new(
        pool.clone(),
        tmp.join("engine.yaml"),
        HttpHealthRestarter {
            client: reqwest::Client::new(),
            health_url: "http://127.0.0.1:0/health".to_string(),
            poll_interval: Duration::from_millis(10),
            timeout: Duration::from_millis(50),
        },
    ));

    let service_manager = Arc::new(SystemdServiceManager);
    let uptime_monitor = Arc::new(UptimeMonitor::new(SystemdServiceManager, pool.clone()));

    let stages: Vec<Box<dyn Stage>> = vec![
        Box::new(SizeSniffStage),
        Box::new(AntivirusStage),
        Box::new(RuleScanStage::new(Arc::new(FileBackedRuleMatcher::new(None)))),
        Box::new(ContentPolicyStage),
        Box::new(SanitizationStage),
        Box::new(HashBlacklistStage::new(Arc::new(HashBlacklist::empty()))),
    ];
    let quarantine_config = QuarantineConfig::default();
    let quarantine_pipeline = Arc::new(PipelineDriver::new(pool.clone(), stages, quarantine_config.clone()));

    let update_paths = Arc::new(UpdatePaths {
        staging_root: tmp.join("staging"),
        backup_root: tmp.join("backup"),
        install_root: tmp.join("install"),
        public_key_path: tmp.join("update_signing_key.pub"),
    });

    AppState {
        pool,
        session_secret: Arc::new(b"test-only-session-secret-not-for-production".to_vec()),
        gpu,
        runner,
        adapter_manager,
        service_manager,
        uptime_monitor,
        quarantine: Arc::new(RwLock::new(quarantine_config)),
        quarantine_pipeline,
        update_paths,
        http_client: reqwest::Client::new(),
        inference_base_url: Arc::from("http://127.0.0.1:0"),
        id_gen: UuidIdGen,
    }
}

/// A per-process-unique suffix for each test's scratch directory, so
/// concurrently-running tests never collide on the same tempdir.
fn uuid_like() -> String {
    uuid::Uuid::new_v4().to_string()
}
