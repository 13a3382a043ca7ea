//! Runtime configuration.
//!
//! Defaults live here as constants. [`Config::from_env`] overrides them from
//! `LOOKUPMASK_*` variables (a `.env` file is loaded by the binary first);
//! command-line flags override the environment.

use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_OUTPUT_DIR: &str = "output";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub const ENV_PORT: &str = "LOOKUPMASK_PORT";
pub const ENV_OUTPUT_DIR: &str = "LOOKUPMASK_OUTPUT_DIR";
pub const ENV_MAX_UPLOAD_BYTES: &str = "LOOKUPMASK_MAX_UPLOAD_BYTES";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// HTTP listen port
    pub port: u16,
    /// Root directory for output files; one sub-directory per dialect
    pub output_dir: PathBuf,
    /// Request body limit for multipart uploads
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Config {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read overrides through `get`; blank values are ignored.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = get(ENV_PORT) {
            config.port = parse_number(ENV_PORT, &value)?;
        }
        if let Some(value) = get(ENV_OUTPUT_DIR) {
            config.output_dir = PathBuf::from(value.trim());
        }
        if let Some(value) = get(ENV_MAX_UPLOAD_BYTES) {
            config.max_upload_bytes = parse_number(ENV_MAX_UPLOAD_BYTES, &value)?;
        }

        Ok(config)
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(env(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.port, 3000);
        assert_eq!(config.output_dir, PathBuf::from("output"));
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(env(&[
            (ENV_PORT, "8080"),
            (ENV_OUTPUT_DIR, " /tmp/masked "),
            (ENV_MAX_UPLOAD_BYTES, "1024"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/masked"));
        assert_eq!(config.max_upload_bytes, 1024);
    }

    #[test]
    fn test_blank_values_ignored() {
        let config = Config::from_lookup(env(&[(ENV_PORT, "  ")])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(env(&[(ENV_PORT, "http")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_PORT,
                value: "http".into()
            }
        );
    }
}
