use edge_auth::routes::{ProtectedRule, RouteMatcher};
use http::Method;

#[test]
fn test_no_rules_everything_open() {
    let matcher = RouteMatcher::default();
    assert!(!matcher.is_protected("/", &Method::GET));
    assert!(!matcher.is_protected("/admin", &Method::POST));
}

#[test]
fn test_exact_and_segment_boundary() {
    let matcher = RouteMatcher::new(vec![ProtectedRule::new("/admin", &[])]);
    assert!(matcher.is_protected("/admin", &Method::GET));
    assert!(matcher.is_protected("/admin/", &Method::GET));
    assert!(matcher.is_protected("/admin/users", &Method::DELETE));
    assert!(!matcher.is_protected("/administration", &Method::GET));
    assert!(!matcher.is_protected("/adm", &Method::GET));
    assert!(!matcher.is_protected("/", &Method::GET));
}

#[test]
fn test_prefix_with_trailing_slash() {
    let matcher = RouteMatcher::new(vec![ProtectedRule::new("/api/", &[])]);
    assert!(matcher.is_protected("/api/", &Method::GET));
    assert!(matcher.is_protected("/api/items", &Method::GET));
    assert!(!matcher.is_protected("/api", &Method::GET));
}

#[test]
fn test_wildcard_is_plain_prefix() {
    let matcher = RouteMatcher::new(vec![ProtectedRule::new("/api*", &[])]);
    assert!(matcher.is_protected("/api", &Method::GET));
    assert!(matcher.is_protected("/api-v2/items", &Method::GET));
    assert!(matcher.is_protected("/apix", &Method::GET));
    assert!(!matcher.is_protected("/ap", &Method::GET));
}

#[test]
fn test_root_rule_protects_everything() {
    let matcher = RouteMatcher::new(vec![ProtectedRule::new("/", &[])]);
    assert!(matcher.is_protected("/", &Method::GET));
    assert!(matcher.is_protected("/anything/at/all", &Method::PUT));
}

#[test]
fn test_method_restriction_case_insensitive() {
    let matcher = RouteMatcher::new(vec![ProtectedRule::new("/items", &["post", "Delete"])]);
    assert!(matcher.is_protected("/items", &Method::POST));
    assert!(matcher.is_protected("/items/1", &Method::DELETE));
    assert!(!matcher.is_protected("/items", &Method::GET));
    let custom = Method::from_bytes(b"post").expect("custom method");
    assert!(matcher.is_protected("/items", &custom));
}

#[test]
fn test_first_matching_rule_wins() {
    let matcher = RouteMatcher::new(vec![
        ProtectedRule::new("/items", &["POST"]),
        ProtectedRule::new("/items*", &[]),
        ProtectedRule::new("/items/special", &["GET"]),
    ]);
    let rule = matcher
        .matching_rule("/items/special", &Method::POST)
        .expect("should match");
    assert_eq!(rule.prefix, "/items");
    assert_eq!(rule.methods, vec!["POST".to_string()]);

    let rule = matcher
        .matching_rule("/items/special", &Method::GET)
        .expect("should match");
    assert_eq!(rule.prefix, "/items*");
}

#[test]
fn test_method_mismatch_continues_scanning() {
    let matcher = RouteMatcher::new(vec![
        ProtectedRule::new("/items", &["POST"]),
        ProtectedRule::new("/items/public", &["PUT"]),
    ]);
    assert!(matcher.is_protected("/items/public", &Method::PUT));
    assert!(!matcher.is_protected("/items/public", &Method::GET));
}

#[test]
fn test_rule_deserialization_defaults() {
    let rules: Vec<ProtectedRule> = serde_json::from_str(
        r#"[
            {"prefix": "/secret"},
            {"prefix": "/items", "methods": ["post", "put"]},
            {"methods": null},
            {}
        ]"#,
    )
    .expect("rules should parse");

    assert_eq!(rules[0], ProtectedRule::new("/secret", &[]));
    assert_eq!(rules[1].methods, vec!["POST".to_string(), "PUT".to_string()]);
    assert_eq!(rules[2].prefix, "/");
    assert!(rules[2].methods.is_empty());
    assert_eq!(rules[3].prefix, "/");
}
