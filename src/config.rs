use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::render::{RenderConfig, RenderConfigError, DEFAULT_CHARACTER_LIMIT, TRUNCATION_MARGIN};

/// Default timeout for tool operations (30 seconds).
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 30;

/// Default `max_results` when a search omits it.
pub const DEFAULT_MAX_RESULTS: u8 = 5;

/// Upper bound accepted for `max_results`.
pub const MAX_RESULTS_LIMIT: u8 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    InvalidValue {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error(transparent)]
    Render(#[from] RenderConfigError),
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub render: RenderConfig,
    pub default_max_results: u8,
    pub tool_timeout: Duration,
    /// Alternate seed file; the built-in collection is used when unset.
    pub documents_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            default_max_results: DEFAULT_MAX_RESULTS,
            tool_timeout: Duration::from_secs(DEFAULT_TOOL_TIMEOUT_SECS),
            documents_path: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment.
    ///
    /// - `KB_CHARACTER_LIMIT` (optional, default 25000): response budget in chars
    /// - `KB_DEFAULT_MAX_RESULTS` (optional, default 5, range 1-10)
    /// - `KB_TOOL_TIMEOUT_SECS` (optional, default 30): max seconds per tool call
    /// - `KB_DOCUMENTS_PATH` (optional): JSON document array replacing the seed
    pub fn from_env() -> Result<Self, ConfigError> {
        let character_limit = parse_var(
            "KB_CHARACTER_LIMIT",
            "a positive integer",
            DEFAULT_CHARACTER_LIMIT,
        )?;

        let default_max_results = parse_var(
            "KB_DEFAULT_MAX_RESULTS",
            "an integer between 1 and 10",
            DEFAULT_MAX_RESULTS,
        )?;
        if !(1..=MAX_RESULTS_LIMIT).contains(&default_max_results) {
            return Err(ConfigError::InvalidValue {
                name: "KB_DEFAULT_MAX_RESULTS",
                expected: "an integer between 1 and 10",
                value: default_max_results.to_string(),
            });
        }

        let tool_timeout_secs = parse_var(
            "KB_TOOL_TIMEOUT_SECS",
            "a positive integer",
            DEFAULT_TOOL_TIMEOUT_SECS,
        )?;

        let documents_path = std::env::var_os("KB_DOCUMENTS_PATH").map(PathBuf::from);

        Ok(Self {
            render: RenderConfig::new(character_limit, TRUNCATION_MARGIN)?,
            default_max_results,
            tool_timeout: Duration::from_secs(tool_timeout_secs),
            documents_path,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(val) => val.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
            name,
            expected,
            value: val,
        }),
        Err(_) => Ok(default),
    }
}
