use super::*;
use std::collections::BTreeMap;
use vault_core::ids::UpdateJobId;

fn test_manifest() -> Manifest {
    let mut components = BTreeMap::new();
    components.insert("code".to_string(), true);
    components.insert("database".to_string(), false);
    Manifest {
        version: "2.0.0".to_string(),
        min_compatible_version: "1.0.0".to_string(),
        created_at: Utc::now(),
        changelog: "adds things".to_string(),
        components,
        files: Vec::new(),
    }
}

fn test_paths(dir: &tempfile::TempDir) -> UpdatePaths {
    UpdatePaths {
        staging_root: dir.path().join("staging"),
        backup_root: dir.path().join("backup"),
        install_root: dir.path().join("install"),
        public_key_path: dir.path().join("key.b64"),
    }
}

#[tokio::test]
async fn apply_rejects_wrong_confirmation() {
    let pool = vault_storage::pool::open_in_memory().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let paths = test_paths(&dir);
    let manifest = test_manifest();

    let result = apply(&pool, &paths, UpdateJobId::new("u1"), &manifest, false, "nope").await;
    assert!(matches!(result, Err(UpdateError::BadConfirmation { .. })));
}

#[tokio::test]
async fn apply_replaces_enabled_component_and_completes() {
    let pool = vault_storage::pool::open_in_memory().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let paths = test_paths(&dir);
    let manifest = test_manifest();

    std::fs::create_dir_all(paths.staging_root.join("code")).unwrap();
    std::fs::write(paths.staging_root.join("code/main.rs"), b"new code").unwrap();

    let job = apply(&pool, &paths, UpdateJobId::new("u2"), &manifest, false, APPLY_CONFIRMATION)
        .await
        .unwrap();

    assert_eq!(job.status, vault_core::update_job::UpdateJobStatus::Completed);
    assert_eq!(
        std::fs::read(paths.install_root.join("code/main.rs")).unwrap(),
        b"new code"
    );
}

#[tokio::test]
async fn apply_with_backup_enabled_snapshots_before_replacing() {
    let pool = vault_storage::pool::open_in_memory().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let paths = test_paths(&dir);
    let manifest = test_manifest();

    std::fs::create_dir_all(paths.install_root.join("code")).unwrap();
    std::fs::write(paths.install_root.join("code/main.rs"), b"original code").unwrap();
    std::fs::create_dir_all(paths.staging_root.join("code")).unwrap();
    std::fs::write(paths.staging_root.join("code/main.rs"), b"new code").unwrap();

    let job = apply(&pool, &paths, UpdateJobId::new("u3"), &manifest, true, APPLY_CONFIRMATION)
        .await
        .unwrap();

    assert_eq!(job.status, vault_core::update_job::UpdateJobStatus::Completed);
    assert_eq!(
        std::fs::read(paths.backup_root.join("code/main.rs")).unwrap(),
        b"original code"
    );
    assert_eq!(
        std::fs::read(paths.install_root.join("code/main.rs")).unwrap(),
        b"new code"
    );
}

#[tokio::test]
async fn rollback_rejects_wrong_confirmation() {
    let pool = vault_storage::pool::open_in_memory().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let paths = test_paths(&dir);
    let from_job = UpdateJob::new(
        UpdateJobId::new("u4"),
        "2.0.0",
        "1.0.0",
        "changelog",
        vec![("code".to_string(), true)],
        Utc::now(),
    );

    let result = rollback(&pool, &paths, UpdateJobId::new("u5"), &from_job, "nope").await;
    assert!(matches!(result, Err(UpdateError::BadConfirmation { .. })));
}

#[tokio::test]
async fn rollback_without_backup_fails() {
    let pool = vault_storage::pool::open_in_memory().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let paths = test_paths(&dir);
    let from_job = UpdateJob::new(
        UpdateJobId::new("u6"),
        "2.0.0",
        "1.0.0",
        "changelog",
        vec![("code".to_string(), true)],
        Utc::now(),
    );

    let result = rollback(&pool, &paths, UpdateJobId::new("u7"), &from_job, ROLLBACK_CONFIRMATION).await;
    assert!(matches!(result, Err(UpdateError::NoBackup)));
}

#[tokio::test]
async fn rollback_restores_backup_and_records_rolled_back_job() {
    let pool = vault_storage::pool::open_in_memory().await.unwrap();
    let dir = tempfile::tempdir().unwrap();
    let paths = test_paths(&dir);

    std::fs::create_dir_all(paths.backup_root.join("code")).unwrap();
    std::fs::write(paths.backup_root.join("code/main.rs"), b"backed up code").unwrap();
    std::fs::create_dir_all(paths.install_root.join("code")).unwrap();
    std::fs::write(paths.install_root.join("code/main.rs"), b"broken code").unwrap();

    let mut from_job = UpdateJob::new(
        UpdateJobId::new("u8"),
        "2.0.0",
        "1.0.0",
        "changelog",
        vec![("code".to_string(), true)],
        Utc::now(),
    );
    from_job.backup_path = Some(paths.backup_root.display().to_string());

    let job = rollback(&pool, &paths, UpdateJobId::new("u9"), &from_job, ROLLBACK_CONFIRMATION)
        .await
        .unwrap();

    assert_eq!(job.status, vault_core::update_job::UpdateJobStatus::RolledBack);
    assert_eq!(
        std::fs::read(paths.install_root.join("code/main.rs")).unwrap(),
        b"backed up code"
    );
}
