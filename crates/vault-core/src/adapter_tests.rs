use super::*;

fn ts() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

#[test]
fn activating_sets_status_and_timestamp() {
    let mut adapter = Adapter::new(
        AdapterId::new("a1"),
        "my-lora",
        "llama",
        AdapterType::Lora,
        "/adapters/a1",
        1024,
        ts(),
    );
    adapter.activate(ts());
    assert!(adapter.is_active());
    assert_eq!(adapter.activated_at, Some(ts()));
}

#[test]
fn rejects_second_active_adapter_with_same_name() {
    let mut existing = Adapter::new(
        AdapterId::new("a1"),
        "shared-name",
        "llama",
        AdapterType::Lora,
        "/adapters/a1",
        1024,
        ts(),
    );
    existing.activate(ts());
    let candidate = AdapterId::new("a2");
    let result = at_most_one_active_by_name([&existing], &candidate);
    assert_eq!(result, Err(AdapterId::new("a1")));
}

#[test]
fn allows_reactivating_the_same_adapter() {
    let mut existing = Adapter::new(
        AdapterId::new("a1"),
        "shared-name",
        "llama",
        AdapterType::Lora,
        "/adapters/a1",
        1024,
        ts(),
    );
    existing.activate(ts());
    let result = at_most_one_active_by_name([&existing], &AdapterId::new("a1"));
    assert!(result.is_ok());
}
