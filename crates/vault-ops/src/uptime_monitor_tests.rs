use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use vault_core::ids::UptimeEventId;

use crate::service_manager::{LogFilter, LogRecord, RestartOutcome, ServiceError, ServiceStatus};

struct ScriptedManager {
    call: AtomicUsize,
    states: Vec<RunState>,
}

#[async_trait::async_trait]
impl ServiceManager for ScriptedManager {
    async fn status(&self, name: &str) -> Result<ServiceStatus, ServiceError> {
        let idx = self.call.fetch_add(1, Ordering::SeqCst) % self.states.len();
        Ok(ServiceStatus {
            name: name.to_string(),
            state: self.states[idx],
            uptime_seconds: None,
        })
    }

    async fn list(&self) -> Vec<ServiceStatus> {
        Vec::new()
    }

    async fn restart(&self, _name: &str) -> Result<RestartOutcome, ServiceError> {
        Ok(RestartOutcome::Skipped)
    }

    async fn logs(&self, _filter: LogFilter) -> Vec<LogRecord> {
        Vec::new()
    }
}

fn ids(prefix: &str, n: usize) -> Vec<UptimeEventId> {
    (0..n).map(|i| UptimeEventId::new(format!("{prefix}-{i}"))).collect()
}

#[tokio::test]
async fn first_poll_from_unknown_records_no_event() {
    let pool = vault_storage::pool::open_in_memory().await.unwrap();
    let manager = ScriptedManager {
        call: AtomicUsize::new(0),
        states: vec![RunState::Running; ALLOWLIST.len()],
    };
    let monitor = UptimeMonitor::new(manager, pool.clone());

    let mut event_ids = ids("e", 10).into_iter();
    let written = monitor.poll_once(&mut event_ids).await;
    assert_eq!(written, 0);
}

#[tokio::test]
async fn up_to_down_transition_emits_down_event() {
    let pool = vault_storage::pool::open_in_memory().await.unwrap();
    let manager = ScriptedManager {
        call: AtomicUsize::new(0),
        states: vec![RunState::Running; ALLOWLIST.len()],
    };
    let monitor = UptimeMonitor::new(manager, pool.clone());
    let mut event_ids = ids("e", 50).into_iter();
    monitor.poll_once(&mut event_ids).await;

    // Flip every service to stopped and poll again.
    *monitor.last_state.lock().unwrap() = ALLOWLIST.iter().map(|n| (n.to_string(), LastState::Up)).collect();
    let manager2 = ScriptedManager {
        call: AtomicUsize::new(0),
        states: vec![RunState::Stopped; ALLOWLIST.len()],
    };
    let monitor2 = UptimeMonitor::new(manager2, pool.clone());
    *monitor2.last_state.lock().unwrap() = ALLOWLIST.iter().map(|n| (n.to_string(), LastState::Up)).collect();

    let written = monitor2.poll_once(&mut event_ids).await;
    assert_eq!(written, ALLOWLIST.len());

    let events = uptime_events::for_service(&pool, ALLOWLIST[0], Utc::now() - chrono::Duration::days(1))
        .await
        .unwrap();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0].event_type, vault_core::uptime::UptimeEventType::Down));
    assert!(events[0].duration_seconds.is_none());
}
