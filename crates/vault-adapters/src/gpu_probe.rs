// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! GPU topology probing, behind a trait so the scheduler's admission logic
//! can be tested against synthetic topologies without a real device.

use async_trait::async_trait;
use tokio::process::Command;

use crate::subprocess::{run_with_timeout, GPU_PROBE_TIMEOUT};

/// One detected GPU's current utilization snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct GpuStatus {
    pub index: u32,
    pub memory_used_pct: f64,
}

#[async_trait]
pub trait GpuProbe: Send + Sync {
    /// Detected GPUs in index order. An empty vector means "no GPU" —
    /// the scheduler treats that as a developer machine and permits
    /// admission unconditionally.
    async fn detect(&self) -> Vec<GpuStatus>;
}

/// Shells out to `nvidia-smi --query-gpu=index,memory.used,memory.total
/// --format=csv,noheader,nounits` and parses the CSV. Any failure
/// (missing binary, timeout, malformed output) is treated as "no GPU
/// detected" rather than an error, matching the spec's developer-machine
/// fallback.
#[derive(Debug, Clone, Default)]
pub struct NvidiaSmiProbe;

#[async_trait]
impl GpuProbe for NvidiaSmiProbe {
    async fn detect(&self) -> Vec<GpuStatus> {
        let mut cmd = Command::new("nvidia-smi");
        cmd.args([
            "--query-gpu=index,memory.used,memory.total",
            "--format=csv,noheader,nounits",
        ]);
        let Ok(output) = run_with_timeout(cmd, GPU_PROBE_TIMEOUT, "nvidia-smi").await else {
            return Vec::new();
        };
        if !output.status.success() {
            return Vec::new();
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        stdout.lines().filter_map(parse_csv_line).collect()
    }
}

fn parse_csv_line(line: &str) -> Option<GpuStatus> {
    let mut parts = line.split(',').map(str::trim);
    let index: u32 = parts.next()?.parse().ok()?;
    let used: f64 = parts.next()?.parse().ok()?;
    let total: f64 = parts.next()?.parse().ok()?;
    if total <= 0.0 {
        return None;
    }
    Some(GpuStatus {
        index,
        memory_used_pct: (used / total) * 100.0,
    })
}

/// Fixed topology for tests.
#[derive(Debug, Clone, Default)]
pub struct FakeGpuProbe {
    pub gpus: Vec<GpuStatus>,
}

#[async_trait]
impl GpuProbe for FakeGpuProbe {
    async fn detect(&self) -> Vec<GpuStatus> {
        self.gpus.clone()
    }
}

#[cfg(test)]
#[path = "gpu_probe_tests.rs"]
mod tests;
