use super::*;

fn ts() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

#[test]
fn local_user_satisfies_invariant() {
    let user = User::new_local(UserId::new("u1"), "Ada", "ada@example.com", Role::User, "hash", ts());
    assert!(user.check_invariant().is_ok());
}

#[test]
fn directory_user_satisfies_invariant() {
    let user = User::new_directory(
        UserId::new("u2"),
        "Grace",
        "grace@example.com",
        Role::Admin,
        "cn=grace,dc=example",
        ts(),
    );
    assert!(user.check_invariant().is_ok());
    assert!(user.is_admin());
}

#[test]
fn local_user_missing_hash_violates_invariant() {
    let mut user = User::new_local(UserId::new("u3"), "Bad", "bad@example.com", Role::User, "hash", ts());
    user.credential_hash = None;
    assert!(matches!(
        user.check_invariant(),
        Err(UserInvariantError::MissingCredentialHash)
    ));
}

#[test]
fn disabled_user_is_not_active() {
    let mut user = User::new_local(UserId::new("u4"), "C", "c@example.com", Role::User, "h", ts());
    user.status = UserStatus::Disabled;
    assert!(!user.is_active());
}
