//! Runtime settings.
//!
//! Resolution order (later wins): built-in defaults, `.env` / process
//! environment, command-line flags.
//!
//! | Variable | Default |
//! | - | - |
//! | `GEM_MODEL_PATH` | `artifacts/model.json` |
//! | `GEM_PREPROCESSOR_PATH` | `artifacts/preprocessor.json` |
//! | `GEM_BIND_ADDR` | `0.0.0.0:8000` |
//! | `GEM_API_URL` | `http://localhost:8000` |
//! | `GEM_LOG` | `info` (falls back to `RUST_LOG`) |

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::AppError;
use crate::io::{DEFAULT_MODEL_PATH, DEFAULT_PREPROCESSOR_PATH};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub model_path: PathBuf,
    pub preprocessor_path: PathBuf,
    pub bind_addr: SocketAddr,
    pub api_url: String,
    pub log_filter: String,
}

impl Settings {
    /// Load `.env` (if present) and read settings from the environment.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let bind_raw = non_empty("GEM_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = parse_bind_addr(&bind_raw)?;

        Ok(Self {
            model_path: non_empty("GEM_MODEL_PATH")
                .unwrap_or_else(|| DEFAULT_MODEL_PATH.to_string())
                .into(),
            preprocessor_path: non_empty("GEM_PREPROCESSOR_PATH")
                .unwrap_or_else(|| DEFAULT_PREPROCESSOR_PATH.to_string())
                .into(),
            bind_addr,
            api_url: non_empty("GEM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            log_filter: non_empty("GEM_LOG")
                .or_else(|| non_empty("RUST_LOG"))
                .unwrap_or_else(|| "info".to_string()),
        })
    }
}

pub fn parse_bind_addr(raw: &str) -> Result<SocketAddr, AppError> {
    raw.parse()
        .map_err(|e| AppError::new(2, format!("Invalid bind address '{raw}': {e}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(settings.bind_addr.port(), 8000);
        assert_eq!(settings.api_url, DEFAULT_API_URL);
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn environment_overrides_and_blank_values() {
        let settings = Settings::from_lookup(lookup(&[
            ("GEM_MODEL_PATH", "/srv/model.json"),
            ("GEM_PREPROCESSOR_PATH", "  "),
            ("GEM_BIND_ADDR", "127.0.0.1:9000"),
            ("RUST_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(settings.model_path, PathBuf::from("/srv/model.json"));
        assert_eq!(settings.preprocessor_path, PathBuf::from(DEFAULT_PREPROCESSOR_PATH));
        assert_eq!(settings.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(settings.log_filter, "debug");
    }

    #[test]
    fn invalid_bind_addr_is_a_usage_error() {
        let err = Settings::from_lookup(lookup(&[("GEM_BIND_ADDR", "localhost")])).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
