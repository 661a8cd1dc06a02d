use super::*;
use std::io::Write;

fn write_test_archive(dir: &Path, manifest_json: &str) -> std::path::PathBuf {
    let archive_path = dir.join("bundle.tar");
    let file = std::fs::File::create(&archive_path).unwrap();
    let mut builder = tar::Builder::new(file);

    let mut header = tar::Header::new_gnu();
    header.set_size(manifest_json.len() as u64);
    header.set_cksum();
    builder
        .append_data(&mut header, "vault-update-2.0.0/manifest.json", manifest_json.as_bytes())
        .unwrap();
    builder.finish().unwrap();
    archive_path
}

#[test]
fn reads_well_formed_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let manifest_json = r#"{
        "version": "2.0.0",
        "min_compatible_version": "1.5.0",
        "created_at": "2026-01-01T00:00:00Z",
        "changelog": "bug fixes",
        "components": {"database": true, "code": true},
        "files": [{"path": "code/main.rs", "sha256": "abc", "size": 10}]
    }"#;
    let archive_path = write_test_archive(dir.path(), manifest_json);

    let manifest = read_manifest(&archive_path).unwrap();
    assert_eq!(manifest.version, "2.0.0");
    assert_eq!(manifest.files.len(), 1);
    assert_eq!(manifest.components.get("database"), Some(&true));
}

#[test]
fn missing_manifest_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let archive_path = dir.path().join("empty.tar");
    let file = std::fs::File::create(&archive_path).unwrap();
    let builder = tar::Builder::new(file);
    builder.into_inner().unwrap().flush().unwrap();

    let result = read_manifest(&archive_path);
    assert!(matches!(result, Err(ManifestError::Missing)));
}

#[test]
fn malformed_manifest_json_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let archive_path = write_test_archive(dir.path(), "not json");
    let result = read_manifest(&archive_path);
    assert!(matches!(result, Err(ManifestError::Malformed(_))));
}
