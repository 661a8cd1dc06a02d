use super::*;
use serde_json::json;

#[tokio::test]
async fn set_then_load_round_trips() {
    let pool = crate::pool::open_in_memory().await.unwrap();
    set(&pool, "quarantine.auto_approve_clean", &json!(true)).await.unwrap();
    let config = load(&pool).await.unwrap();
    assert!(config.get_bool("quarantine.auto_approve_clean", false));
}

#[tokio::test]
async fn set_twice_overwrites() {
    let pool = crate::pool::open_in_memory().await.unwrap();
    set(&pool, "training.max_memory_pct", &json!(80.0)).await.unwrap();
    set(&pool, "training.max_memory_pct", &json!(90.0)).await.unwrap();
    let config = load(&pool).await.unwrap();
    assert_eq!(config.get_f64("training.max_memory_pct", 0.0), 90.0);
}
