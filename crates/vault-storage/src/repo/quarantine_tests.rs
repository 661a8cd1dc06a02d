use super::*;

fn ts() -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

#[tokio::test]
async fn job_and_file_round_trip() {
    let pool = crate::pool::open_in_memory().await.unwrap();
    let job = QuarantineJob::new(QuarantineJobId::new("q1"), 1, SourceType::Upload, None, ts());
    insert_job(&pool, &job).await.unwrap();

    let mut file = QuarantineFile::new(
        QuarantineFileId::new("f1"),
        job.id.clone(),
        "data.csv",
        100,
        "/quarantine/q1/f1",
        ts(),
    );
    insert_file(&pool, &file).await.unwrap();

    file.transition(QuarantineFileStatus::Scanning, ts()).unwrap();
    file.transition(QuarantineFileStatus::Held, ts()).unwrap();
    update_file(&pool, &file).await.unwrap();

    let held = held_files(&pool).await.unwrap();
    assert_eq!(held.len(), 1);
    assert_eq!(held[0].id, file.id);

    let job_files = files_for_job(&pool, &job.id).await.unwrap();
    assert_eq!(job_files.len(), 1);
}
