use std::collections::HashMap;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> =
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn from_lookup_defaults() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[("HOME", "/home/ann")])).unwrap();
    assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    assert_eq!(cfg.session_dir, PathBuf::from("/home/ann/.quillpost"));
    assert_eq!(cfg.boot_policy, BootPolicy::Optimistic);
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 30, connect_secs: 10 });
    assert_eq!(cfg.auth_errors, AuthErrorPolicy::default());
}

#[test]
fn from_lookup_without_home_uses_relative_dir() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg.session_dir, PathBuf::from(".quillpost"));
}

#[test]
fn from_lookup_parses_overrides() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[
        ("QUILLPOST_BASE_URL", "https://blog.example.test/ "),
        ("QUILLPOST_SESSION_DIR", "/tmp/qp"),
        ("QUILLPOST_BOOT_POLICY", "Strict"),
        ("QUILLPOST_REQUEST_TIMEOUT_SECS", "5"),
        ("QUILLPOST_CONNECT_TIMEOUT_SECS", "2"),
        ("QUILLPOST_AUTH_ERROR_CODES", "TOKEN_EXPIRED, AUTH_REQUIRED"),
        ("QUILLPOST_BAN_ERROR_CODES", "USER_BANNED,USER_SUSPENDED"),
    ]))
    .unwrap();
    assert_eq!(cfg.base_url, "https://blog.example.test");
    assert_eq!(cfg.session_dir, PathBuf::from("/tmp/qp"));
    assert_eq!(cfg.boot_policy, BootPolicy::Strict);
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 5, connect_secs: 2 });
    assert_eq!(cfg.auth_errors.auth_codes, vec!["TOKEN_EXPIRED", "AUTH_REQUIRED"]);
    assert_eq!(cfg.auth_errors.ban_codes, vec!["USER_BANNED", "USER_SUSPENDED"]);
}

#[test]
fn from_lookup_ignores_bad_timeouts() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[("QUILLPOST_REQUEST_TIMEOUT_SECS", "soon")])).unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
}

#[test]
fn from_lookup_empty_code_list_keeps_defaults() {
    let cfg = ClientConfig::from_lookup(lookup_from(&[("QUILLPOST_AUTH_ERROR_CODES", " , ")])).unwrap();
    assert_eq!(cfg.auth_errors.auth_codes, vec!["AUTH_REQUIRED", "AUTH_INVALID_TOKEN"]);
}

#[test]
fn from_lookup_rejects_unknown_boot_policy() {
    let err = ClientConfig::from_lookup(lookup_from(&[("QUILLPOST_BOOT_POLICY", "lazy")])).unwrap_err();
    assert!(err.to_string().contains("lazy"));
    assert_eq!(err.code(), "CONFIG_PARSE");
}

#[test]
fn auth_policy_requires_matching_status() {
    let policy = AuthErrorPolicy::default();
    assert!(policy.is_auth_error(401, "AUTH_REQUIRED"));
    assert!(policy.is_auth_error(401, "AUTH_INVALID_TOKEN"));
    assert!(!policy.is_auth_error(403, "AUTH_REQUIRED"));
    assert!(!policy.is_auth_error(401, "VALIDATION_ERROR"));
    assert!(policy.is_ban_error(403, "USER_BANNED"));
    assert!(!policy.is_ban_error(401, "USER_BANNED"));
}

#[test]
fn new_trims_trailing_slash() {
    assert_eq!(ClientConfig::new("http://localhost:9000/").base_url, "http://localhost:9000");
}
