// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The coordinated-restart [`EngineRestarter`] used in production: signals
//! the inference engine to restart out of band (left to the surrounding
//! process supervisor) and polls its health endpoint until it responds.

use std::time::Duration;

use async_trait::async_trait;
use vault_ops::adapters::EngineRestarter;

pub struct HttpHealthRestarter {
    pub client: reqwest::Client,
    pub health_url: String,
    pub poll_interval: Duration,
    pub timeout: Duration,
}

#[async_trait]
impl EngineRestarter for HttpHealthRestarter {
    async fn restart_and_wait_healthy(&self) -> Result<(), String> {
        let deadline = tokio::time::Instant::now() + self.timeout;
        loop {
            let healthy = self
                .client
                .get(&self.health_url)
                .send()
                .await
                .map(|r| r.status().is_success())
                .unwrap_or(false);
            if healthy {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(format!("{} did not report healthy before the timeout", self.health_url));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
