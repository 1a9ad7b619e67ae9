use crudrules::config::ApiConfig;
use std::io::Write;

fn temp_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_yaml_with_partial_fields() {
    let file = temp_file(".yaml", "base_path: /svc\nmax_limit: 250\n");
    let config = ApiConfig::load(file.path()).unwrap();
    assert_eq!(config.base_path, "/svc");
    assert_eq!(config.max_limit, 250);
    assert_eq!(config.default_limit, 100);
    assert_eq!(config.default_format, "json");
}

#[test]
fn test_load_json() {
    let file = temp_file(".json", r#"{"default_format":"yaml","default_limit":5}"#);
    let config = ApiConfig::load(file.path()).unwrap();
    assert_eq!(config.default_format, "yaml");
    assert_eq!(config.default_limit, 5);
}

#[test]
fn test_load_rejects_unknown_keys_and_bad_limits() {
    let file = temp_file(".yaml", "base_path: /svc\nport: 8080\n");
    assert!(ApiConfig::load(file.path()).is_err());

    let file = temp_file(".yaml", "default_limit: 10\nmax_limit: 5\n");
    let err = ApiConfig::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("exceeds max_limit"));
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(ApiConfig::load(&dir.path().join("absent.yaml")).is_err());
}
