use super::*;
use chrono::Duration;

#[test]
fn classify_age_missing_when_absent() {
    assert_eq!(classify_age(None, Utc::now()), Freshness::Missing);
}

#[test]
fn classify_age_fresh_under_24_hours() {
    let now = Utc::now();
    let at = now - Duration::hours(1);
    assert_eq!(classify_age(Some(at), now), Freshness::Fresh);
}

#[test]
fn classify_age_stale_between_24_and_168_hours() {
    let now = Utc::now();
    let at = now - Duration::hours(48);
    assert_eq!(classify_age(Some(at), now), Freshness::Stale);
}

#[test]
fn classify_age_outdated_at_or_beyond_168_hours() {
    let now = Utc::now();
    let at = now - Duration::hours(200);
    assert_eq!(classify_age(Some(at), now), Freshness::Outdated);
}

#[tokio::test]
async fn signature_report_reports_missing_for_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let report = signature_report(dir.path(), Utc::now()).await;
    assert_eq!(report.av, Freshness::Missing);
    assert_eq!(report.rules, Freshness::Missing);
    assert_eq!(report.hash_blacklist, Freshness::Missing);
}

#[tokio::test]
async fn install_bundle_sorts_files_by_kind() {
    let source = tempfile::tempdir().unwrap();
    tokio::fs::write(source.path().join("eicar.yar"), "rule eicar {}").await.unwrap();
    tokio::fs::write(source.path().join("blacklist.json"), r#"{"hashes": ["aa"]}"#)
        .await
        .unwrap();
    tokio::fs::write(source.path().join("av-defs.dat"), b"binary defs").await.unwrap();

    let dest = tempfile::tempdir().unwrap();
    let report = install_bundle(source.path(), dest.path()).await.unwrap();

    assert_eq!(report.rule_files_installed, 1);
    assert_eq!(report.av_files_installed, 1);
    assert!(report.blacklist_installed);
    assert!(dest.path().join("rules/eicar.yar").exists());
    assert!(dest.path().join("blacklist.json").exists());
}

#[tokio::test]
async fn install_bundle_rejects_malformed_blacklist() {
    let source = tempfile::tempdir().unwrap();
    tokio::fs::write(source.path().join("blacklist.json"), "not json").await.unwrap();

    let dest = tempfile::tempdir().unwrap();
    let result = install_bundle(source.path(), dest.path()).await;
    assert!(matches!(result, Err(BundleInstallError::InvalidBlacklistShape(_))));
}
