// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `vaultd`: the appliance control-plane process.

use tokio::net::TcpListener;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info};
use vault_core::id::UuidIdGen;
use vault_core::ids::UptimeEventId;
use vault_daemon::build::{self, BuildError};
use vault_daemon::config::{ConfigError, Settings};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("HTTP server error: {0}")]
    Serve(#[source] std::io::Error),
    #[error("failed to install signal handler: {0}")]
    Signal(#[source] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("vaultd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("vaultd {}", env!("CARGO_PKG_VERSION"));
                println!("Vault appliance control-plane daemon.");
                println!();
                println!("USAGE:");
                println!("    vaultd");
                println!();
                println!("Configuration is read from the environment (VAULT_STATE_DIR,");
                println!("VAULT_HTTP_BIND, VAULT_DB_PATH, ...); see vault-daemon/src/config.rs.");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: vaultd [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let settings = Settings::load()?;
    rotate_log_if_needed(&settings.log_path);
    let _log_guard = setup_logging(&settings.log_path);

    info!(state_dir = %settings.state_dir.display(), "starting vaultd");

    if let Err(e) = run(settings).await {
        error!(error = %e, "vaultd failed to start");
        return Err(e.into());
    }

    info!("vaultd stopped");
    Ok(())
}

async fn run(settings: Settings) -> Result<(), StartupError> {
    let state = build::build_state(&settings).await?;

    let mut sigterm = signal(SignalKind::terminate()).map_err(StartupError::Signal)?;
    let mut sigint = signal(SignalKind::interrupt()).map_err(StartupError::Signal)?;

    let uptime_monitor = state.uptime_monitor.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(vault_ops::uptime_monitor::POLL_INTERVAL);
        let id_gen = UuidIdGen;
        loop {
            interval.tick().await;
            let mut ids = std::iter::repeat_with(|| UptimeEventId::new(vault_core::id::IdGen::next(&id_gen)));
            let written = uptime_monitor.poll_once(&mut ids).await;
            if written > 0 {
                tracing::debug!(written, "recorded uptime transitions");
            }
        }
    });

    let addr = settings.http_bind;
    let router = vault_api::build_router(state);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind { addr, source })?;

    info!(%addr, "vaultd ready");
    println!("READY");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            tokio::select! {
                _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
                _ = sigint.recv() => info!("received SIGINT, shutting down"),
            }
        })
        .await
        .map_err(StartupError::Serve)?;

    Ok(())
}

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;
const MAX_ROTATED_LOGS: u32 = 3;

/// Shifts `vaultd.log` -> `.1` -> `.2` -> `.3`, dropping the oldest, once
/// the active log exceeds [`MAX_LOG_SIZE`]. Best-effort: a failure here
/// must never block startup.
fn rotate_log_if_needed(log_path: &std::path::Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };
    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();
    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }
    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

fn setup_logging(log_path: &std::path::Path) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let parent = log_path.parent().unwrap_or_else(|| std::path::Path::new("."));
    if std::fs::create_dir_all(parent).is_err() {
        return None;
    }
    let file_name = log_path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("vaultd.log"));
    let file_appender = tracing_appender::rolling::never(parent, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Some(guard)
}
