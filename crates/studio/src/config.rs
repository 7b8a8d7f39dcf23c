use std::path::PathBuf;
use std::time::Duration;

use dgb_client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use dgb_core::history::DEFAULT_HISTORY_CAP;

/// Default location of the persisted auth session.
pub const DEFAULT_SESSION_FILE: &str = ".dgb_session.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Studio configuration loaded from environment variables.
///
/// All fields have defaults suitable for a backend running locally.
#[derive(Debug, Clone, PartialEq)]
pub struct StudioConfig {
    /// Backend API base URL.
    pub api_url: String,
    /// Per-request timeout for every backend call.
    pub request_timeout: Duration,
    /// Number of results kept in the session history.
    pub history_cap: usize,
    /// JSON file holding the signed-in session between runs.
    pub session_file: PathBuf,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_TIMEOUT,
            history_cap: DEFAULT_HISTORY_CAP,
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
        }
    }
}

impl StudioConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                     |
    /// |----------------------------|-----------------------------|
    /// | `DGB_API_URL`              | `http://localhost:8000/api` |
    /// | `DGB_REQUEST_TIMEOUT_SECS` | `120`                       |
    /// | `DGB_HISTORY_CAP`          | `10`                        |
    /// | `DGB_SESSION_FILE`         | `.dgb_session.json`         |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_url = var("DGB_API_URL").unwrap_or(defaults.api_url);

        let request_timeout = match var("DGB_REQUEST_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "DGB_REQUEST_TIMEOUT_SECS",
                        expected: "a positive number of seconds",
                        value: raw,
                    })
                }
            },
            None => defaults.request_timeout,
        };

        let history_cap = match var("DGB_HISTORY_CAP") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(cap) if cap > 0 => cap,
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "DGB_HISTORY_CAP",
                        expected: "a positive integer",
                        value: raw,
                    })
                }
            },
            None => defaults.history_cap,
        };

        let session_file = var("DGB_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.session_file);

        Ok(Self {
            api_url,
            request_timeout,
            history_cap,
            session_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<StudioConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StudioConfig::from_lookup(|name| map.get(name).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, StudioConfig::default());
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.history_cap, 10);
    }

    #[test]
    fn overrides_are_applied() {
        let config = load(&[
            ("DGB_API_URL", "https://dgb.example.com/api"),
            ("DGB_REQUEST_TIMEOUT_SECS", "30"),
            ("DGB_HISTORY_CAP", "50"),
            ("DGB_SESSION_FILE", "/tmp/dgb.json"),
        ])
        .unwrap();
        assert_eq!(config.api_url, "https://dgb.example.com/api");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.history_cap, 50);
        assert_eq!(config.session_file, PathBuf::from("/tmp/dgb.json"));
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = load(&[("DGB_API_URL", "  ")]).unwrap();
        assert_eq!(config.api_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn bad_numbers_are_rejected() {
        assert_matches!(
            load(&[("DGB_REQUEST_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::Invalid { var: "DGB_REQUEST_TIMEOUT_SECS", .. })
        );
        assert_matches!(
            load(&[("DGB_HISTORY_CAP", "0")]),
            Err(ConfigError::Invalid { var: "DGB_HISTORY_CAP", .. })
        );
    }
}
