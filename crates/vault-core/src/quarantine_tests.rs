use super::*;

fn ts() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

#[test]
fn job_completes_after_all_files_accounted_for() {
    let mut job = QuarantineJob::new(QuarantineJobId::new("q1"), 2, SourceType::Upload, None, ts());
    job.start_scanning();
    job.record_file_outcome(false, ts());
    assert_eq!(job.status, QuarantineJobStatus::Scanning);
    job.record_file_outcome(true, ts());
    assert_eq!(job.status, QuarantineJobStatus::Completed);
    assert_eq!(job.files_flagged, 1);
    assert_eq!(job.files_clean, 1);
}

#[test]
fn file_cannot_skip_scanning() {
    let mut file = QuarantineFile::new(
        QuarantineFileId::new("f1"),
        QuarantineJobId::new("q1"),
        "data.csv",
        100,
        "/quarantine/q1/f1",
        ts(),
    );
    let result = file.transition(QuarantineFileStatus::Clean, ts());
    assert!(result.is_err());
}

#[test]
fn findings_track_max_severity() {
    let mut file = QuarantineFile::new(
        QuarantineFileId::new("f2"),
        QuarantineJobId::new("q1"),
        "data.csv",
        100,
        "/quarantine/q1/f2",
        ts(),
    );
    file.record_finding(Finding {
        stage: "av".into(),
        severity: Severity::Low,
        code: "low-risk".into(),
        message: "minor".into(),
        details: serde_json::Value::Null,
    });
    file.record_finding(Finding {
        stage: "rules".into(),
        severity: Severity::Critical,
        code: "blacklisted".into(),
        message: "hash match".into(),
        details: serde_json::Value::Null,
    });
    assert_eq!(file.risk_severity, Severity::Critical);
    assert_eq!(file.findings.len(), 2);
}

#[test]
fn review_approve_sets_audit_fields() {
    let mut file = QuarantineFile::new(
        QuarantineFileId::new("f3"),
        QuarantineJobId::new("q1"),
        "data.csv",
        100,
        "/quarantine/q1/f3",
        ts(),
    );
    file.transition(QuarantineFileStatus::Scanning, ts()).unwrap();
    file.transition(QuarantineFileStatus::Held, ts()).unwrap();
    file.review(true, "looks fine", "admin@example.com", ts()).unwrap();
    assert_eq!(file.status, QuarantineFileStatus::Approved);
    assert_eq!(file.reviewed_by.as_deref(), Some("admin@example.com"));
}

#[test]
fn review_of_non_held_file_fails() {
    let mut file = QuarantineFile::new(
        QuarantineFileId::new("f4"),
        QuarantineJobId::new("q1"),
        "data.csv",
        100,
        "/quarantine/q1/f4",
        ts(),
    );
    let result = file.review(true, "reason", "admin", ts());
    assert!(result.is_err());
}

#[test]
fn severity_ordering() {
    assert!(Severity::Critical > Severity::High);
    assert!(Severity::None < Severity::Low);
}
