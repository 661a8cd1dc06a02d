use super::*;

#[tokio::test]
async fn status_rejects_unknown_service() {
    let manager = SystemdServiceManager;
    let result = manager.status("not-a-real-service").await;
    assert!(matches!(result, Err(ServiceError::UnknownService(_))));
}

#[tokio::test]
async fn restart_refuses_self() {
    let manager = SystemdServiceManager;
    let result = manager.restart(SELF_SERVICE).await;
    assert!(matches!(result, Err(ServiceError::SelfRestartRefused)));
}

#[tokio::test]
async fn restart_rejects_unknown_service() {
    let manager = SystemdServiceManager;
    let result = manager.restart("not-a-real-service").await;
    assert!(matches!(result, Err(ServiceError::UnknownService(_))));
}

#[tokio::test]
async fn list_covers_the_whole_allowlist() {
    let manager = SystemdServiceManager;
    let statuses = manager.list().await;
    assert_eq!(statuses.len(), ALLOWLIST.len());
}

#[test]
fn strip_service_suffix_removes_trailing_unit_suffix() {
    assert_eq!(strip_service_suffix("vault-inference.service"), "vault-inference");
    assert_eq!(strip_service_suffix("vault-inference"), "vault-inference");
}

#[test]
fn severity_priority_mapping_matches_journald_ladder() {
    assert_eq!(LogSeverity::from_priority(0), LogSeverity::Critical);
    assert_eq!(LogSeverity::from_priority(3), LogSeverity::Error);
    assert_eq!(LogSeverity::from_priority(4), LogSeverity::Warning);
    assert_eq!(LogSeverity::from_priority(6), LogSeverity::Info);
    assert_eq!(LogSeverity::from_priority(7), LogSeverity::Debug);
}

#[tokio::test]
async fn synthesized_logs_respect_limit_and_severity_filter() {
    let filter = LogFilter {
        service: Some("vault-inference".to_string()),
        severity: Some(LogSeverity::Info),
        since: None,
        limit: Some(10),
        offset: 0,
    };
    let records = synthesize_logs(&filter);
    assert!(records.iter().all(|r| r.severity == LogSeverity::Info));
    assert!(records.iter().all(|r| r.service == "vault-inference"));
}

#[test]
fn str_seed_is_deterministic() {
    assert_eq!(str_seed("vault-inference"), str_seed("vault-inference"));
}
