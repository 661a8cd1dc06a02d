use super::*;

fn ts() -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

#[tokio::test]
async fn insert_then_get_and_by_name() {
    let pool = crate::pool::open_in_memory().await.unwrap();
    let adapter = Adapter::new(
        AdapterId::new("a1"),
        "shared",
        "llama",
        AdapterType::Lora,
        "/adapters/a1",
        1024,
        ts(),
    );
    insert(&pool, &adapter).await.unwrap();
    let fetched = get(&pool, &adapter.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "shared");
    let siblings = by_name(&pool, "shared").await.unwrap();
    assert_eq!(siblings.len(), 1);
}

#[tokio::test]
async fn delete_removes_row() {
    let pool = crate::pool::open_in_memory().await.unwrap();
    let adapter = Adapter::new(AdapterId::new("a2"), "x", "llama", AdapterType::Full, "/a2", 1, ts());
    insert(&pool, &adapter).await.unwrap();
    delete(&pool, &adapter.id).await.unwrap();
    assert!(get(&pool, &adapter.id).await.unwrap().is_none());
}
