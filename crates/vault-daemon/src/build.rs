// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires every subsystem crate into one `AppState`. Mirrors
//! `vault_api::test_support::state`, but against real I/O: a file-backed
//! database, a probed rule-matcher engine, and a blacklist loaded from
//! disk instead of an empty one.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use thiserror::Error;
use vault_adapters::gpu_probe::NvidiaSmiProbe;
use vault_adapters::rule_matcher::{self, FileBackedRuleMatcher, RuleMatcher};
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
use vault_api::restarter::HttpHealthRestarter;
use vault_api::state::AppState;

use crate::config::Settings;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to open database at {path}: {source}")]
    Storage {
        path: String,
        #[source]
        source: vault_storage::pool::StorageInitError,
    },
}

/// Builds the process's single `AppState` from loaded settings. Runs once,
/// at startup, before the HTTP listener binds.
pub async fn build_state(settings: &Settings) -> Result<AppState, BuildError> {
    if let Some(parent) = settings.db_path.parent() {
        let _ = tokio::fs::create_dir_all(parent).await;
    }

    let pool = vault_storage::pool::open(&settings.db_path)
        .await
        .map_err(|source| BuildError::Storage {
            path: settings.db_path.display().to_string(),
            source,
        })?;

    let gpu = Arc::new(GpuScheduler::new(NvidiaSmiProbe, GpuSchedulerConfig::default()));
    let sink = Arc::new(WorkloadStatusSink::new(pool.clone(), Arc::clone(&gpu)));
    let runner = Arc::new(JobRunner::new(sink));

    let health_url = format!("{}/health", settings.inference_base_url.trim_end_matches('/'));
    let http_client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(5))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());

    let adapter_manager = Arc::new(AdapterManager::new(
        pool.clone(),
        settings.engine_config_path.clone(),
        HttpHealthRestarter {
            client: http_client.clone(),
            health_url,
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(60),
        },
    ));

    let service_manager = Arc::new(SystemdServiceManager);
    let uptime_monitor = Arc::new(UptimeMonitor::new(SystemdServiceManager, pool.clone()));

    let rule_matcher = load_rule_matcher(&settings.rules_dir).await;
    let hash_blacklist = match HashBlacklist::load(&settings.hash_blacklist_path).await {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!(path = %settings.hash_blacklist_path.display(), error = %e, "no hash blacklist loaded, starting empty");
            HashBlacklist::empty()
        }
    };

    let stages: Vec<Box<dyn Stage>> = vec![
        Box::new(SizeSniffStage),
        Box::new(AntivirusStage),
        Box::new(RuleScanStage::new(Arc::new(rule_matcher))),
        Box::new(ContentPolicyStage),
        Box::new(SanitizationStage),
        Box::new(HashBlacklistStage::new(Arc::new(hash_blacklist))),
    ];
    let quarantine_config = QuarantineConfig::default();
    let quarantine_pipeline = Arc::new(PipelineDriver::new(pool.clone(), stages, quarantine_config.clone()));

    let update_paths = Arc::new(UpdatePaths {
        staging_root: settings.update_staging_root.clone(),
        backup_root: settings.update_backup_root.clone(),
        install_root: settings.update_install_root.clone(),
        public_key_path: settings.update_public_key_path.clone(),
    });

    Ok(AppState {
        pool,
        session_secret: Arc::new(settings.session_secret.clone()),
        gpu,
        runner,
        adapter_manager,
        service_manager,
        uptime_monitor,
        quarantine: Arc::new(RwLock::new(quarantine_config)),
        quarantine_pipeline,
        update_paths,
        http_client,
        inference_base_url: Arc::from(settings.inference_base_url.as_str()),
        id_gen: UuidIdGen,
    })
}

/// Probes for an installed rule-matcher engine and loads rule files from
/// `rules_dir`. Never fails the daemon: an unreadable directory or an
/// absent engine just means the quarantine pipeline runs with zero rules
/// loaded, same as a freshly provisioned appliance with no signature
/// bundle installed yet.
async fn load_rule_matcher(rules_dir: &std::path::Path) -> FileBackedRuleMatcher {
    let engine = rule_matcher::probe_engine().await;
    let mut matcher = FileBackedRuleMatcher::new(engine);

    if engine.is_none() {
        tracing::warn!("no rule matcher engine found on this host, quarantine rule scan stage is inert");
        return matcher;
    }

    if let Err(e) = tokio::fs::create_dir_all(rules_dir).await {
        tracing::warn!(dir = %rules_dir.display(), error = %e, "could not create rules directory");
        return matcher;
    }

    match matcher.load_rules(rules_dir).await {
        Ok(count) => tracing::info!(count, dir = %rules_dir.display(), "loaded quarantine rules"),
        Err(e) => tracing::warn!(dir = %rules_dir.display(), error = %e, "failed to load quarantine rules, starting empty"),
    }
    matcher
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
