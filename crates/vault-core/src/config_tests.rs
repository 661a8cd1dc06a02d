use super::*;

#[test]
fn falls_back_to_default_on_miss() {
    let config = SystemConfig::with_defaults([ConfigDefault {
        key: "quarantine.auto_approve_clean",
        value: Value::Bool(false),
    }]);
    assert!(!config.get_bool("quarantine.auto_approve_clean", true));
}

#[test]
fn stored_value_overrides_default() {
    let mut config = SystemConfig::with_defaults([ConfigDefault {
        key: "quarantine.auto_approve_clean",
        value: Value::Bool(false),
    }]);
    config.set("quarantine.auto_approve_clean", Value::Bool(true));
    assert!(config.get_bool("quarantine.auto_approve_clean", false));
}

#[test]
fn missing_key_with_no_default_uses_fallback() {
    let config = SystemConfig::new();
    assert_eq!(config.get_f64("training.max_memory_pct", 90.0), 90.0);
}

#[test]
fn namespace_filters_by_prefix() {
    let mut config = SystemConfig::new();
    config.set("quarantine.strictness_level", Value::String("standard".into()));
    config.set("ldap.base_dn", Value::String("dc=example".into()));
    let keys: Vec<&str> = config.namespace("quarantine").map(|(k, _)| k).collect();
    assert_eq!(keys, vec!["quarantine.strictness_level"]);
}
