// Configuration loading tests

use std::io::Write;

use threefold::config::AppConfig;

#[test]
fn test_default_configuration() {
    let config = AppConfig::default();

    assert_eq!(config.worker.origin, "https://cleave.app");
    assert_eq!(config.worker.cache_prefix, "threefold");
    assert_eq!(config.worker.cache_version, "v1");
    assert!(config.worker.precache.contains(&"/".to_string()));
    assert!(config.worker.precache.contains(&config.worker.offline_path));
    assert_eq!(config.worker.api_prefixes, vec!["/api/".to_string()]);
    assert_eq!(config.worker.backend_marker, "supabase.co");
    assert_eq!(config.notify.default_title, "Cleave");
    assert_eq!(config.notify.default_url, "/dashboard");
    assert!(!config.push.application_server_key.is_empty());
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
        [worker]
        origin = "https://staging.cleave.app"
        cache_version = "v7"
        precache = ["/", "/offline"]

        [push]
        user_agent = "cleave-web/1.0"

        [notify]
        default_tag = "cleave-staging"
        "#
    )
    .unwrap();

    let config = AppConfig::load(file.path()).unwrap();

    assert_eq!(config.worker.origin, "https://staging.cleave.app");
    assert_eq!(config.worker.cache_version, "v7");
    assert_eq!(config.worker.precache.len(), 2);
    // Unspecified fields keep their defaults
    assert_eq!(config.worker.cache_prefix, "threefold");
    assert_eq!(config.push.user_agent.as_deref(), Some("cleave-web/1.0"));
    assert_eq!(config.notify.default_tag, "cleave-staging");
    assert_eq!(config.notify.default_title, "Cleave");
}

#[test]
fn test_missing_file_is_an_error() {
    assert!(AppConfig::load("/nonexistent/threefold.toml").is_err());
}

#[test]
fn test_serialize_round_trip() {
    let config = AppConfig::default();
    let serialized = toml::to_string(&config).unwrap();
    let parsed: AppConfig = toml::from_str(&serialized).unwrap();

    assert_eq!(parsed.worker.cache_version, config.worker.cache_version);
    assert_eq!(parsed.notify.default_url, config.notify.default_url);
    assert_eq!(
        parsed.push.application_server_key,
        config.push.application_server_key
    );
}
