mod loader;
mod types;
mod validate;

pub use loader::{
    load, load_config, load_config_from_str, load_default_config, resolve_config_path,
    CONFIG_ENV_VAR, DEFAULT_CONFIG_FILE, ENV_PREFIX,
};
pub use types::*;
pub use validate::validate_config;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
