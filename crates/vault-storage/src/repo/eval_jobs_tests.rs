use super::*;
use serde_json::json;

fn ts() -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

#[tokio::test]
async fn insert_then_list_round_trips() {
    let pool = crate::pool::open_in_memory().await.unwrap();
    let job = EvalJob::new(
        EvalJobId::new("e1"),
        "eval-1",
        "llama",
        "ds-1",
        DatasetType::Builtin,
        json!({}),
        100,
        ts(),
    );
    insert(&pool, &job).await.unwrap();
    let all = list(&pool).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].total_examples, 100);
}
