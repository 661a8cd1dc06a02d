use super::*;

fn mapping(id: &str, group: &str, role: Role, priority: i32) -> LdapGroupMapping {
    LdapGroupMapping {
        id: LdapGroupMappingId::new(id),
        directory_group_identifier: group.into(),
        role,
        priority,
    }
}

#[test]
fn higher_priority_mapping_wins() {
    let mappings = vec![
        mapping("m1", "cn=users", Role::User, 1),
        mapping("m2", "cn=admins", Role::Admin, 10),
    ];
    let groups = vec!["cn=users".to_string(), "cn=admins".to_string()];
    assert_eq!(resolve_role(&mappings, &groups), Some(Role::Admin));
}

#[test]
fn no_matching_group_returns_none() {
    let mappings = vec![mapping("m1", "cn=admins", Role::Admin, 10)];
    let groups = vec!["cn=guests".to_string()];
    assert_eq!(resolve_role(&mappings, &groups), None);
}
