use super::*;

#[test]
fn username_bounds_and_charset() {
    assert!(validate_username("abc").is_ok());
    assert!(validate_username(&"a".repeat(32)).is_ok());
    assert!(validate_username("snake_Case_9").is_ok());

    let short = validate_username("ab").unwrap_err();
    assert_eq!(short.message, "username length must be 3-32");
    assert!(validate_username(&"a".repeat(33)).is_err());

    let bad = validate_username("no-dashes").unwrap_err();
    assert_eq!(bad.field, "username");
    assert_eq!(bad.code(), "VALIDATION_ERROR");
    assert!(validate_username("ünï").is_err());
}

#[test]
fn password_bounds() {
    assert!(validate_password("12345678").is_ok());
    assert!(validate_password("1234567").is_err());
    assert!(validate_password(&"x".repeat(72)).is_ok());
    assert!(validate_password(&"x".repeat(73)).is_err());
}

#[test]
fn password_change_rules() {
    assert!(validate_password_change("old-secret", "new-secret", "new-secret").is_ok());

    let mismatch = validate_password_change("old-secret", "new-secret", "new-secrex").unwrap_err();
    assert_eq!(mismatch.field, "confirmPassword");

    let same = validate_password_change("same-secret", "same-secret", "same-secret").unwrap_err();
    assert_eq!(same.field, "newPassword");

    assert!(validate_password_change("old-secret", "short", "short").is_err());
}

#[test]
fn lengths_count_utf8_bytes_like_the_backend() {
    assert!(validate_title(&"日".repeat(40)).is_ok());
    let err = validate_title(&"日".repeat(41)).unwrap_err();
    assert_eq!(err.message, "title length must be 1-120");
    assert!(validate_username("ab").is_err());
    assert!(validate_password(&"é".repeat(4)).is_ok());
}

#[test]
fn content_limits() {
    assert!(validate_title("").is_err());
    assert!(validate_content("").is_err());
    assert!(validate_content(&"x".repeat(50_000)).is_ok());
    assert!(validate_content(&"x".repeat(50_001)).is_err());
    assert!(validate_comment(&"x".repeat(2_000)).is_ok());
    assert!(validate_comment(&"x".repeat(2_001)).is_err());
}

#[test]
fn collection_limits() {
    assert!(validate_collection_name("").is_err());
    assert!(validate_collection_name(&"n".repeat(80)).is_ok());
    assert!(validate_collection_description("").is_ok());
    let long = validate_collection_description(&"d".repeat(501)).unwrap_err();
    assert_eq!(long.message, "collection description length must be <=500");
}

#[test]
fn search_query_limits() {
    assert!(validate_search_query("").is_err());
    assert!(validate_search_query(&"q".repeat(100)).is_ok());
    assert!(validate_search_query(&"q".repeat(101)).is_err());
}
