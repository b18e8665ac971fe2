//! Configuration loading tests

use bpmn_modeler::config::{AppConfig, ConfigError, StoreBackend};
use serial_test::serial;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    AppConfig::from_lookup(|key| vars.get(key).cloned())
}

const SECRET: &str = "0123456789abcdef0123456789abcdef";

#[test]
fn test_defaults() {
    let config = load(&[("ID_TOKEN_SECRET", SECRET)]).unwrap();

    assert!(!config.development);
    assert_eq!(config.port, 8081);
    assert_eq!(config.store, StoreBackend::Memory);
    assert_eq!(config.editor.debounce, Duration::from_millis(300));
    assert!(!config.editor.emit_viewport);
    assert_eq!(config.rate_limit_per_minute, 300);
    assert!(config.cors_origins.is_empty());
    assert!(!config.log_json);
}

#[test]
fn test_production_requires_secret() {
    assert_eq!(
        load(&[]).unwrap_err(),
        ConfigError::Missing("ID_TOKEN_SECRET")
    );
    assert!(matches!(
        load(&[("ID_TOKEN_SECRET", "short")]),
        Err(ConfigError::Invalid { name: "ID_TOKEN_SECRET", .. })
    ));
}

#[test]
fn test_development_falls_back_to_dev_secret() {
    let config = load(&[("APP_ENV", "development")]).unwrap();
    assert!(config.development);
    assert!(config.id_token_secret.len() >= 32);
}

#[test]
fn test_store_backends() {
    let file = load(&[
        ("ID_TOKEN_SECRET", SECRET),
        ("STORE_BACKEND", "file"),
        ("STORE_FILE", "/tmp/store.json"),
    ])
    .unwrap();
    assert_eq!(
        file.store,
        StoreBackend::File {
            path: PathBuf::from("/tmp/store.json")
        }
    );

    let rtdb = load(&[
        ("ID_TOKEN_SECRET", SECRET),
        ("STORE_BACKEND", "rtdb"),
        ("RTDB_URL", "https://demo.firebasedatabase.app"),
    ])
    .unwrap();
    assert_eq!(
        rtdb.store,
        StoreBackend::Rtdb {
            url: "https://demo.firebasedatabase.app".to_string(),
            auth: None
        }
    );

    assert_eq!(
        load(&[("ID_TOKEN_SECRET", SECRET), ("STORE_BACKEND", "rtdb")]).unwrap_err(),
        ConfigError::Missing("RTDB_URL")
    );
    assert!(matches!(
        load(&[("ID_TOKEN_SECRET", SECRET), ("STORE_BACKEND", "postgres")]),
        Err(ConfigError::Invalid { name: "STORE_BACKEND", .. })
    ));
}

#[test]
fn test_editor_and_server_settings() {
    let config = load(&[
        ("ID_TOKEN_SECRET", SECRET),
        ("EDITOR_DEBOUNCE_MS", "50"),
        ("EDITOR_EMIT_VIEWPORT", "true"),
        ("PORT", "9000"),
        ("CORS_ALLOWED_ORIGINS", "http://localhost:5173, https://app.example.com,"),
        ("LOG_FORMAT", "JSON"),
    ])
    .unwrap();

    assert_eq!(config.editor.debounce, Duration::from_millis(50));
    assert!(config.editor.emit_viewport);
    assert_eq!(config.port, 9000);
    assert_eq!(
        config.cors_origins,
        vec!["http://localhost:5173", "https://app.example.com"]
    );
    assert!(config.log_json);
}

#[test]
fn test_unparsable_number_is_rejected() {
    assert!(matches!(
        load(&[("ID_TOKEN_SECRET", SECRET), ("PORT", "eighty")]),
        Err(ConfigError::Invalid { name: "PORT", .. })
    ));
}

#[test]
#[serial]
fn test_from_env_reads_process_environment() {
    // SAFETY: serialized with every other test touching the environment
    unsafe {
        std::env::set_var("APP_ENV", "development");
        std::env::set_var("EDITOR_DEBOUNCE_MS", "120");
    }
    let config = AppConfig::from_env();
    unsafe {
        std::env::remove_var("APP_ENV");
        std::env::remove_var("EDITOR_DEBOUNCE_MS");
    }

    let config = config.unwrap();
    assert!(config.development);
    assert_eq!(config.editor.debounce, Duration::from_millis(120));
}
