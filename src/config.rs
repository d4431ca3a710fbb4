use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,
    /// Detected once at load time from hosting-platform environment
    /// variables; never read from the config file.
    #[serde(skip)]
    pub hosted: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            command_timeout_secs: default_command_timeout_secs(),
            hosted: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse YAML in {path}: {source}")]
    Parse {
        path: String,
        source: serde_yaml::Error,
    },
    #[error("config validation failed: {0}")]
    Validation(String),
}

impl Config {
    /// Loads the config file when present, falls back to defaults when
    /// absent, then applies environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        let mut cfg = if path_ref.exists() {
            let path_display = path_ref.display().to_string();
            let text = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
                path: path_display.clone(),
                source,
            })?;
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path_display,
                source,
            })?
        } else {
            Config::default()
        };

        if let Ok(url) = std::env::var("API_BASE_URL") {
            if !url.trim().is_empty() {
                cfg.api_base_url = url.trim().to_string();
            }
        }
        cfg.hosted = detect_hosted_environment();

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api_base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Validation(
                "api_base_url is required".to_string(),
            ));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "api_base_url must start with http:// or https://".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "request_timeout_secs must be >= 1".to_string(),
            ));
        }
        if self.command_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "command_timeout_secs must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn example_yaml() -> &'static str {
        include_str!("../config.yaml.example")
    }
}

/// Serverless hosts run the relay far away from the subject machine;
/// self-probed data there describes the wrong host.
fn detect_hosted_environment() -> bool {
    ["VERCEL", "AWS_LAMBDA_FUNCTION_NAME", "FUNCTIONS_WORKER_RUNTIME"]
        .iter()
        .any(|var| std::env::var(var).map(|v| !v.is_empty()).unwrap_or(false))
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_command_timeout_secs() -> u64 {
    5
}

fn default_api_base_url() -> String {
    "http://localhost:5000".to_string()
}
