//! Application configuration read from the environment.
//!
//! Everything is read once at start-up into [`AppConfig`]. In production
//! (`APP_ENV` other than `development`) the ID token secret is mandatory and
//! must be at least 32 characters; development falls back to a fixed secret
//! with a warning.

use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

const DEV_ID_TOKEN_SECRET: &str = "dev-secret-do-not-use-in-production-change-me-now";
const MIN_SECRET_LEN: usize = 32;

/// Configuration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable is required in production")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Which document store backend to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    /// Process memory, lost on restart
    Memory,
    /// Single JSON file
    File { path: PathBuf },
    /// Realtime database REST API
    Rtdb { url: String, auth: Option<String> },
}

/// Editor adapter settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Quiet period before a change is forwarded
    pub debounce: Duration,
    /// Whether viewport changes are forwarded at all
    pub emit_viewport: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            emit_viewport: false,
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub development: bool,
    pub port: u16,
    pub frontend_dir: PathBuf,
    pub store: StoreBackend,
    pub id_token_secret: String,
    /// Expected `aud` claim of ID tokens, if any
    pub id_token_audience: Option<String>,
    pub editor: EditorConfig,
    pub rate_limit_per_minute: u32,
    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
    pub log_json: bool,
}

impl AppConfig {
    /// Read the configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_env = lookup("APP_ENV").unwrap_or_else(|| "production".to_string());
        let development = app_env.eq_ignore_ascii_case("development");

        let id_token_secret = match lookup("ID_TOKEN_SECRET") {
            Some(secret) => secret,
            None if development => {
                warn!("ID_TOKEN_SECRET not set! Using default secret for development. DO NOT USE IN PRODUCTION!");
                DEV_ID_TOKEN_SECRET.to_string()
            }
            None => return Err(ConfigError::Missing("ID_TOKEN_SECRET")),
        };
        if id_token_secret.len() < MIN_SECRET_LEN {
            if development {
                warn!("ID_TOKEN_SECRET is less than 32 characters. Consider using a longer secret.");
            } else {
                return Err(ConfigError::Invalid {
                    name: "ID_TOKEN_SECRET",
                    reason: format!("must be at least {} characters", MIN_SECRET_LEN),
                });
            }
        }

        let store = match lookup("STORE_BACKEND").as_deref().unwrap_or("memory") {
            "memory" => StoreBackend::Memory,
            "file" => StoreBackend::File {
                path: lookup("STORE_FILE")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("data/store.json")),
            },
            "rtdb" => StoreBackend::Rtdb {
                url: lookup("RTDB_URL").ok_or(ConfigError::Missing("RTDB_URL"))?,
                auth: lookup("RTDB_AUTH"),
            },
            other => {
                return Err(ConfigError::Invalid {
                    name: "STORE_BACKEND",
                    reason: format!("unknown backend '{}' (expected memory, file or rtdb)", other),
                });
            }
        };

        let editor = EditorConfig {
            debounce: Duration::from_millis(parse_or(&lookup, "EDITOR_DEBOUNCE_MS", 300)?),
            emit_viewport: parse_or(&lookup, "EDITOR_EMIT_VIEWPORT", false)?,
        };

        Ok(Self {
            development,
            port: parse_or(&lookup, "PORT", 8081)?,
            frontend_dir: lookup("FRONTEND_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("frontend/dist")),
            store,
            id_token_secret,
            id_token_audience: lookup("ID_TOKEN_AUDIENCE"),
            editor,
            rate_limit_per_minute: parse_or(&lookup, "RATE_LIMIT_PER_MINUTE", 300)?,
            cors_origins: lookup("CORS_ALLOWED_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            log_json: lookup("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
        })
    }

    /// Configuration for tests and local runs: in-memory store, development secret.
    pub fn development() -> Self {
        Self {
            development: true,
            port: 8081,
            frontend_dir: PathBuf::from("frontend/dist"),
            store: StoreBackend::Memory,
            id_token_secret: DEV_ID_TOKEN_SECRET.to_string(),
            id_token_audience: None,
            editor: EditorConfig::default(),
            rate_limit_per_minute: 300,
            cors_origins: Vec::new(),
            log_json: false,
        }
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
