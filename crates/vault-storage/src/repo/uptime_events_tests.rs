use super::*;

fn ts(secs: i64) -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(secs, 0).unwrap()
}

#[tokio::test]
async fn close_open_down_fills_duration() {
    let pool = crate::pool::open_in_memory().await.unwrap();
    let down = UptimeEvent::down(UptimeEventId::new("e1"), "inference", ts(1_700_000_000));
    insert(&pool, &down).await.unwrap();

    let closed = close_open_down(&pool, "inference", 42.0).await.unwrap();
    assert_eq!(closed, Some(UptimeEventId::new("e1")));

    let events = for_service(&pool, "inference", ts(0)).await.unwrap();
    assert_eq!(events[0].duration_seconds, Some(42.0));
}

#[tokio::test]
async fn no_open_down_event_returns_none() {
    let pool = crate::pool::open_in_memory().await.unwrap();
    let closed = close_open_down(&pool, "inference", 10.0).await.unwrap();
    assert!(closed.is_none());
}
