use super::*;
use serde::Deserialize;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Payload {
    step: u32,
    label: String,
}

#[tokio::test]
async fn write_then_read_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.json");
    let payload = Payload {
        step: 3,
        label: "running".into(),
    };
    write_json_atomic(&path, &payload).await.unwrap();
    let read_back: Option<Payload> = read_json_tolerant(&path).await.unwrap();
    assert_eq!(read_back, Some(payload));
}

#[tokio::test]
async fn missing_file_reads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.json");
    let read_back: Option<Payload> = read_json_tolerant(&path).await.unwrap();
    assert_eq!(read_back, None);
}

#[tokio::test]
async fn malformed_json_reads_as_none_not_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.json");
    tokio::fs::write(&path, b"{not valid json").await.unwrap();
    let read_back: Result<Option<Payload>, _> = read_json_tolerant(&path).await;
    assert_eq!(read_back.unwrap(), None);
}

#[tokio::test]
async fn no_tmp_file_left_behind_after_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("status.json");
    write_json_atomic(&path, &Payload { step: 1, label: "x".into() })
        .await
        .unwrap();
    let tmp = tmp_path_for(&path);
    assert!(!tmp.exists());
    assert!(path.exists());
}
