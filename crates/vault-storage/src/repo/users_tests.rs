use super::*;

fn ts() -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

#[tokio::test]
async fn insert_then_find_by_email() {
    let pool = crate::pool::open_in_memory().await.unwrap();
    let user = User::new_local(UserId::new("u1"), "Ada", "ada@example.com", Role::User, "hash", ts());
    insert_user(&pool, &user).await.unwrap();
    let found = get_user_by_email(&pool, "ada@example.com").await.unwrap().unwrap();
    assert_eq!(found.id, user.id);
}

#[tokio::test]
async fn api_key_hash_lookup_only_finds_active() {
    let pool = crate::pool::open_in_memory().await.unwrap();
    let key = ApiKey {
        id: ApiKeyId::new("0"),
        key_hash: "hash123".into(),
        key_prefix: "sk-abcdefgh".into(),
        label: "ci".into(),
        scope: ApiKeyScope::User,
        is_active: true,
        user_id: None,
        created_at: ts(),
        last_used_at: None,
        notes: None,
    };
    let id = insert_api_key(&pool, &key).await.unwrap();
    let found = find_by_hash(&pool, "hash123").await.unwrap().unwrap();
    assert_eq!(found.id, ApiKeyId::new(id.to_string()));
}
