use super::*;

const SECRET: &[u8] = b"test-secret-do-not-use-in-production";

#[test]
fn issued_token_verifies_and_round_trips_claims() {
    let now = Utc::now();
    let token = issue(SECRET, "user-1", Role::Admin, now);
    let claims = verify(SECRET, &token, now).unwrap();
    assert_eq!(claims.user_id, "user-1");
    assert_eq!(claims.role, Role::Admin);
}

#[test]
fn expired_token_is_rejected() {
    let issued_at = Utc::now() - Duration::hours(13);
    let token = issue(SECRET, "user-1", Role::User, issued_at);
    let result = verify(SECRET, &token, Utc::now());
    assert_eq!(result, Err(SessionError::Expired));
}

#[test]
fn tampered_payload_fails_signature_check() {
    let now = Utc::now();
    let token = issue(SECRET, "user-1", Role::User, now);
    let (encoded, signature) = token.split_once('.').unwrap();
    let tampered = format!("{encoded}a.{signature}");
    let result = verify(SECRET, &tampered, now);
    assert_eq!(result, Err(SessionError::BadSignature));
}

#[test]
fn wrong_secret_fails_signature_check() {
    let now = Utc::now();
    let token = issue(SECRET, "user-1", Role::User, now);
    let result = verify(b"a-different-secret", &token, now);
    assert_eq!(result, Err(SessionError::BadSignature));
}

#[test]
fn malformed_token_without_separator_is_rejected() {
    let result = verify(SECRET, "not-a-token", Utc::now());
    assert_eq!(result, Err(SessionError::Malformed));
}
