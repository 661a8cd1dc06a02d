use super::*;
use vault_core::ids::{QuarantineFileId, QuarantineJobId};
use vault_core::quarantine::{QuarantineFile, QuarantineFileStatus};
use vault_storage::repo::quarantine as repo;

async fn held_file(pool: &SqlitePool, dir: &tempfile::TempDir) -> QuarantineFileId {
    let job_id = QuarantineJobId::new("job-1");
    let file_id = QuarantineFileId::new("file-1");
    let staged = dir.path().join("staged.bin");
    tokio::fs::write(&staged, b"contents").await.unwrap();

    let now = Utc::now();
    let mut file = QuarantineFile::new(file_id.clone(), job_id, "upload.bin", 8, staged.display().to_string(), now);
    file.transition(QuarantineFileStatus::Scanning, now).unwrap();
    file.transition(QuarantineFileStatus::Held, now).unwrap();
    repo::insert_file(pool, &file).await.unwrap();
    file_id
}

#[tokio::test]
async fn approve_copies_file_and_writes_audit_entry() {
    let pool = vault_storage::pool::open_in_memory().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file_id = held_file(&pool, &dir).await;
    let destination = dir.path().join("approved.bin");

    approve(
        &pool,
        AuditLogEntryId::new("audit-1"),
        &file_id,
        &destination,
        "looks fine",
        "admin",
    )
    .await
    .unwrap();

    assert!(destination.exists());
    let file = repo::get_file(&pool, &file_id).await.unwrap().unwrap();
    assert_eq!(file.status, QuarantineFileStatus::Approved);

    let entries = audit_log::recent(&pool, 10).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "quarantine.file.approved");
}

#[tokio::test]
async fn reject_deletes_file_and_writes_audit_entry() {
    let pool = vault_storage::pool::open_in_memory().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file_id = held_file(&pool, &dir).await;

    let file = repo::get_file(&pool, &file_id).await.unwrap().unwrap();
    let staged_path = file.paths.quarantine.clone();

    reject(&pool, AuditLogEntryId::new("audit-2"), &file_id, "bad content", "admin")
        .await
        .unwrap();

    assert!(!std::path::Path::new(&staged_path).exists());
    let file = repo::get_file(&pool, &file_id).await.unwrap().unwrap();
    assert_eq!(file.status, QuarantineFileStatus::Rejected);

    let entries = audit_log::recent(&pool, 10).await.unwrap();
    assert_eq!(entries[0].action, "quarantine.file.rejected");
}

#[tokio::test]
async fn approve_non_held_file_is_conflict() {
    let pool = vault_storage::pool::open_in_memory().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let file_id = held_file(&pool, &dir).await;
    let destination = dir.path().join("approved.bin");

    approve(
        &pool,
        AuditLogEntryId::new("audit-3"),
        &file_id,
        &destination,
        "first approval",
        "admin",
    )
    .await
    .unwrap();

    let result = approve(
        &pool,
        AuditLogEntryId::new("audit-4"),
        &file_id,
        &destination,
        "second approval",
        "admin",
    )
    .await;
    assert!(matches!(result, Err(ReviewError::NotHeld(_))));
}

#[test]
fn is_reviewable_only_true_for_held() {
    assert!(is_reviewable(QuarantineFileStatus::Held));
    assert!(!is_reviewable(QuarantineFileStatus::Clean));
    assert!(!is_reviewable(QuarantineFileStatus::Approved));
}
