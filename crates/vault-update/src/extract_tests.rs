use super::*;
use crate::manifest::ManifestFileEntry;
use sha2::Digest;
use std::collections::BTreeMap;

fn append_raw(builder: &mut tar::Builder<std::fs::File>, path: &str, contents: &[u8], entry_type: EntryType) {
    let mut header = tar::Header::new_gnu();
    header.set_entry_type(entry_type);
    header.set_size(contents.len() as u64);
    header.set_path(path).unwrap();
    header.set_cksum();
    builder.append(&header, contents).unwrap();
}

fn build_archive(dir: &Path, entries: &[(&str, &[u8])]) -> std::path::PathBuf {
    let archive_path = dir.join("bundle.tar");
    let file = std::fs::File::create(&archive_path).unwrap();
    let mut builder = tar::Builder::new(file);
    for (path, contents) in entries {
        append_raw(&mut builder, path, contents, EntryType::Regular);
    }
    builder.finish().unwrap();
    archive_path
}

#[test]
fn safe_relative_path_is_accepted() {
    assert!(is_safe_relative_path(Path::new("vault-update-2.0.0/code/main.rs")));
}

#[test]
fn parent_traversal_path_is_rejected() {
    assert!(!is_safe_relative_path(Path::new("vault-update-2.0.0/../../etc/passwd")));
}

#[test]
fn absolute_path_is_rejected() {
    assert!(!is_safe_relative_path(Path::new("/etc/passwd")));
}

#[test]
fn extract_filtered_writes_regular_files_under_staging_root() {
    let dir = tempfile::tempdir().unwrap();
    let archive_path = build_archive(
        dir.path(),
        &[("vault-update-2.0.0/code/main.rs", b"fn main() {}")],
    );
    let staging = dir.path().join("staging");
    extract_filtered(&archive_path, &staging).unwrap();
    assert_eq!(std::fs::read(staging.join("code/main.rs")).unwrap(), b"fn main() {}");
}

#[test]
fn extract_filtered_rejects_parent_traversal_member() {
    let dir = tempfile::tempdir().unwrap();
    let archive_path = dir.path().join("bundle.tar");
    let file = std::fs::File::create(&archive_path).unwrap();
    let mut builder = tar::Builder::new(file);
    append_raw(&mut builder, "vault-update-2.0.0/../escape.txt", b"evil", EntryType::Regular);
    builder.finish().unwrap();

    let staging = dir.path().join("staging");
    let result = extract_filtered(&archive_path, &staging);
    assert!(matches!(result, Err(ExtractError::UnsafeMember(_))));
}

#[test]
fn verify_checksums_passes_for_matching_digest() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("code")).unwrap();
    std::fs::write(dir.path().join("code/main.rs"), b"fn main() {}").unwrap();
    let digest = hex::encode(sha2::Sha256::digest(b"fn main() {}"));

    let manifest = Manifest {
        version: "2.0.0".to_string(),
        min_compatible_version: "1.0.0".to_string(),
        created_at: chrono::Utc::now(),
        changelog: String::new(),
        components: BTreeMap::new(),
        files: vec![ManifestFileEntry {
            path: "code/main.rs".to_string(),
            sha256: digest,
            size: 12,
        }],
    };
    verify_checksums(dir.path(), &manifest).unwrap();
}

#[test]
fn verify_checksums_fails_on_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("main.rs"), b"tampered").unwrap();

    let manifest = Manifest {
        version: "2.0.0".to_string(),
        min_compatible_version: "1.0.0".to_string(),
        created_at: chrono::Utc::now(),
        changelog: String::new(),
        components: BTreeMap::new(),
        files: vec![ManifestFileEntry {
            path: "main.rs".to_string(),
            sha256: "0000000000000000000000000000000000000000000000000000000000000".to_string(),
            size: 8,
        }],
    };
    let result = verify_checksums(dir.path(), &manifest);
    assert!(matches!(result, Err(ExtractError::ChecksumMismatch { .. })));
}
