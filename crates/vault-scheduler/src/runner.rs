// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess supervision for training and evaluation workers.
//!
//! One `JobRunner` instance serves either workload kind — the behavior is
//! identical, only the `StatusSink` it reports to differs. Progress
//! reporting and adapter hand-off are pushed through that narrow trait so
//! the runner never depends on the job service's full repository API,
//! breaking what would otherwise be a runner/service reference cycle.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::process::{Child, Command};
use tokio::sync::watch;
use vault_storage::atomic_file::{write_json_atomic, AtomicWriteError};

use crate::status_file::WorkerStatus;

pub const POLL_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("a job is already active")]
    JobConflict,
    #[error("gpu admission denied: {0}")]
    GpuDenied(String),
    #[error("failed to write run config: {0}")]
    ConfigWrite(#[from] AtomicWriteError),
    #[error("failed to spawn worker: {0}")]
    Spawn(std::io::Error),
}

/// What the supervisor decided once the child process exited, independent
/// of how it arrived there. Kept as a pure function of the exit code so
/// it can be unit tested without ever spawning a process.
#[derive(Debug, Clone, PartialEq)]
pub enum ExitOutcome {
    Completed,
    Paused,
    Cancelled,
    Failed,
}

/// Exit code 42 means "checkpointed and paused" (training only);
/// `128 + SIGTERM` means the worker honored our terminate signal.
pub fn classify_exit(code: Option<i32>, terminate_requested: bool) -> ExitOutcome {
    const SIGTERM: i32 = 15;
    match code {
        Some(0) => ExitOutcome::Completed,
        Some(42) => ExitOutcome::Paused,
        Some(c) if c == 128 + SIGTERM && terminate_requested => ExitOutcome::Cancelled,
        _ if terminate_requested => ExitOutcome::Cancelled,
        _ => ExitOutcome::Failed,
    }
}

/// Heuristically rewrites a raw CUDA OOM stderr excerpt into actionable
/// guidance; any other text passes through untouched.
pub fn rewrite_error_message(raw: &str) -> String {
    if raw.to_lowercase().contains("cuda out of memory") {
        format!(
            "GPU ran out of memory during this run. Reduce batch size or sequence length, \
             or choose a smaller adapter type, then retry. (original error: {})",
            raw.lines().next().unwrap_or(raw)
        )
    } else {
        raw.to_string()
    }
}

/// Caps the error text persisted with a failed job at the shared
/// [`vault_core::job::MAX_ERROR_LEN`] budget.
pub fn cap_error_len(message: &str) -> String {
    let mut m = message.to_string();
    if m.len() > vault_core::job::MAX_ERROR_LEN {
        m.truncate(vault_core::job::MAX_ERROR_LEN);
    }
    m
}

/// Narrow callback surface the runner pushes progress and terminal
/// outcomes through, so it never touches the job repository directly.
#[async_trait]
pub trait StatusSink: Send + Sync {
    async fn mark_running(&self, job_id: &str, started_at: DateTime<Utc>, gpu_index: Option<u32>);
    async fn apply_progress(&self, job_id: &str, status: &WorkerStatus);
    async fn mark_completed(&self, job_id: &str, status: &WorkerStatus);
    async fn mark_paused(&self, job_id: &str);
    async fn mark_cancelled(&self, job_id: &str);
    async fn mark_failed(&self, job_id: &str, error: String);
    /// Registers a newly produced adapter. Called only for training jobs
    /// that report an `adapter_id` in their final status.
    async fn register_adapter(&self, job_id: &str, worker_adapter_id: &str, output_dir: &PathBuf) {
        let _ = (job_id, worker_adapter_id, output_dir);
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub job_id: String,
    pub status_dir: PathBuf,
    pub interpreter: PathBuf,
    pub script_args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub is_training: bool,
}

enum Signal {
    None,
    Cancel,
    Pause,
}

struct ActiveJob {
    job_id: String,
    signal_tx: watch::Sender<Signal>,
}

/// Supervises at most one child process at a time.
pub struct JobRunner<S: StatusSink> {
    active: Mutex<Option<ActiveJob>>,
    sink: Arc<S>,
}

impl<S: StatusSink + 'static> JobRunner<S> {
    pub fn new(sink: Arc<S>) -> Self {
        Self {
            active: Mutex::new(None),
            sink,
        }
    }

    pub fn active_job_id(&self) -> Option<String> {
        self.active.lock().as_ref().map(|a| a.job_id.clone())
    }

    pub async fn start_job(
        self: Arc<Self>,
        config: RunConfig,
        run_config_blob: &serde_json::Value,
        gpu_index: Option<u32>,
    ) -> Result<(), RunnerError> {
        {
            let mut active = self.active.lock();
            if active.is_some() {
                return Err(RunnerError::JobConflict);
            }
            let (signal_tx, _rx) = watch::channel(Signal::None);
            *active = Some(ActiveJob {
                job_id: config.job_id.clone(),
                signal_tx,
            });
        }

        let config_path = config.status_dir.join("config.json");
        write_json_atomic(&config_path, run_config_blob).await?;

        let started_at = Utc::now();
        self.sink
            .mark_running(&config.job_id, started_at, gpu_index)
            .await;

        let mut cmd = Command::new(&config.interpreter);
        cmd.args(&config.script_args);
        for (key, value) in &config.env {
            cmd.env(key, value);
        }
        if let Some(index) = gpu_index {
            cmd.env("CUDA_VISIBLE_DEVICES", index.to_string());
        }
        cmd.kill_on_drop(true);

        let child = cmd.spawn().map_err(RunnerError::Spawn)?;

        let signal_rx = {
            let active = self.active.lock();
            active.as_ref().unwrap().signal_tx.subscribe()
        };

        let job_id = config.job_id.clone();
        let status_path = config.status_dir.join("status.json");
        let sink = Arc::clone(&self.sink);
        let runner = Arc::clone(&self);
        tokio::spawn(async move {
            supervise(job_id.clone(), status_path, child, signal_rx, sink).await;
            runner.clear_active(&job_id);
        });

        Ok(())
    }

    pub fn cancel_job(&self, job_id: &str) -> bool {
        self.send_signal(job_id, Signal::Cancel)
    }

    pub fn pause_job(&self, job_id: &str) -> bool {
        self.send_signal(job_id, Signal::Pause)
    }

    fn send_signal(&self, job_id: &str, signal: Signal) -> bool {
        let active = self.active.lock();
        match active.as_ref() {
            Some(a) if a.job_id == job_id => {
                let _ = a.signal_tx.send(signal);
                true
            }
            _ => false,
        }
    }

    fn clear_active(&self, job_id: &str) {
        let mut active = self.active.lock();
        if matches!(active.as_ref(), Some(a) if a.job_id == job_id) {
            *active = None;
        }
    }
}

/// The 2 s poll / cancel / pause multiplex. Lives on its own task so
/// `start_job` returns immediately once the child is spawned.
async fn supervise<S: StatusSink + 'static>(
    job_id: String,
    status_path: PathBuf,
    mut child: Child,
    mut signal_rx: watch::Receiver<Signal>,
    sink: Arc<S>,
) {
    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    let mut terminate_requested = false;
    let mut pause_requested = false;

    let exit_status = loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Ok(Some(status)) = vault_storage::atomic_file::read_json_tolerant::<WorkerStatus>(&status_path).await {
                    sink.apply_progress(&job_id, &status).await;
                }
            }
            changed = signal_rx.changed() => {
                if changed.is_ok() {
                    match *signal_rx.borrow() {
                        Signal::Cancel => {
                            terminate_requested = true;
                            let _ = send_terminate(&child);
                        }
                        Signal::Pause => {
                            pause_requested = true;
                            let _ = send_pause(&child);
                        }
                        Signal::None => {}
                    }
                }
            }
            status = child.wait() => {
                break status;
            }
        }
    };

    let code = exit_status.ok().and_then(|s| s.code());
    let outcome = if pause_requested && code == Some(42) {
        ExitOutcome::Paused
    } else {
        classify_exit(code, terminate_requested)
    };

    let final_status = vault_storage::atomic_file::read_json_tolerant::<WorkerStatus>(&status_path)
        .await
        .ok()
        .flatten();

    match outcome {
        ExitOutcome::Completed => {
            let status = final_status.unwrap_or_default();
            if let Some(adapter_id) = status.adapter_id.clone() {
                let output_dir = status_path.parent().map(Path::to_path_buf).unwrap_or_else(|| status_path.clone());
                sink.register_adapter(&job_id, &adapter_id, &output_dir).await;
            }
            sink.mark_completed(&job_id, &status).await;
        }
        ExitOutcome::Paused => {
            sink.mark_paused(&job_id).await;
        }
        ExitOutcome::Cancelled => {
            sink.mark_cancelled(&job_id).await;
        }
        ExitOutcome::Failed => {
            let error = final_status
                .as_ref()
                .and_then(|s| s.error.clone())
                .unwrap_or_else(|| "worker exited with an unexpected status".to_string());
            sink.mark_failed(&job_id, cap_error_len(&rewrite_error_message(&error)))
                .await;
        }
    }
}

/// Sends the portable "terminate" signal (SIGTERM). Workers are expected
/// to exit within a bounded grace period; a harder signal is left to a
/// future escalation path.
#[cfg(unix)]
fn send_terminate(child: &Child) -> std::io::Result<()> {
    send_signal(child, nix::sys::signal::Signal::SIGTERM)
}

/// Sends the "user-defined pause" signal (SIGUSR1). Training workers are
/// expected to trap it, checkpoint, and exit with code 42.
#[cfg(unix)]
fn send_pause(child: &Child) -> std::io::Result<()> {
    send_signal(child, nix::sys::signal::Signal::SIGUSR1)
}

#[cfg(unix)]
fn send_signal(child: &Child, signal: nix::sys::signal::Signal) -> std::io::Result<()> {
    let Some(pid) = child.id() else {
        return Ok(());
    };
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid as i32), signal)
        .map_err(|errno| std::io::Error::from_raw_os_error(errno as i32))
}

#[cfg(not(unix))]
fn send_terminate(child: &Child) -> std::io::Result<()> {
    let _ = child;
    Ok(())
}

#[cfg(not(unix))]
fn send_pause(child: &Child) -> std::io::Result<()> {
    let _ = child;
    Ok(())
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
