#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use resource_registry::config::{self, ConfigError};

#[test]
fn empty_document_uses_defaults() {
    let cfg = config::load_from_str("").expect("must parse");
    assert_eq!(cfg.server.listen, "0.0.0.0:8080");
    assert_eq!(cfg.registry.seed_size, 10);
    assert_eq!(cfg.metrics.rules.len(), 1);
    assert_eq!(cfg.metrics.rules[0].label, "/api/resources/*");
}

#[test]
fn ok_full_config() {
    let ok = r#"
server:
  listen: "127.0.0.1:9090"
  static_dir: "public"
registry:
  seed_size: 25
metrics:
  path: "/prometheus"
  buckets: [0.01, 0.1, 1.0]
  rules:
    - pattern: "/api/resources/*"
      label: "/api/resources/:id"
    - pattern: "/api/**"
      label: "/api/other"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.listen_addr().unwrap().port(), 9090);
    assert_eq!(cfg.server.static_dir, "public");
    assert_eq!(cfg.registry.seed_size, 25);
    assert_eq!(cfg.metrics.path, "/prometheus");
    assert_eq!(cfg.metrics.buckets, vec![0.01, 0.1, 1.0]);

    let generalizer = cfg.metrics.generalizer().unwrap();
    assert_eq!(generalizer.generalize("/api/resources/5"), "/api/resources/:id");
    assert_eq!(generalizer.generalize("/api/metrics"), "/api/other");
    assert_eq!(generalizer.generalize("/metrics"), "/metrics");
}

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
registry:
  seed_sise: 5 # typo should fail
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(matches!(err, ConfigError::Parse(_)), "{err}");
}

#[test]
fn rejects_invalid_listen_address() {
    let bad = r#"
server:
  listen: "not-an-address"
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
}

#[test]
fn rejects_misplaced_double_wildcard() {
    let bad = r#"
metrics:
  rules:
    - pattern: "/api/**/x"
      label: "/api/x"
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(matches!(err, ConfigError::Rule(_)), "{err}");
}

#[test]
fn rejects_empty_bucket_list() {
    let bad = r#"
metrics:
  buckets: []
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(matches!(err, ConfigError::Invalid(_)), "{err}");
}
