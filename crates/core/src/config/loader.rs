use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{types::Config, ConfigError};

/// Prefix of environment overrides, e.g. `CMSPROD_TOOLS__CMS_RUN`.
pub const ENV_PREFIX: &str = "CMSPROD_";

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "CMSPROD_CONFIG";

/// Config file picked up from the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "cmsprod.toml";

fn base() -> Figment {
    Figment::from(Serialized::defaults(Config::default()))
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    figment
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from file with environment variable overrides.
///
/// Keys missing from the file keep their built-in defaults, so a file only
/// needs the values it changes.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(base().merge(Toml::file(path)))
}

/// Built-in defaults with environment variable overrides.
pub fn load_default_config() -> Result<Config, ConfigError> {
    extract(base())
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    base()
        .merge(Toml::string(toml_str))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// The config file to use: an explicit path, then `$CMSPROD_CONFIG`, then
/// `cmsprod.toml` if the working directory has one.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(path));
    }

    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    local.exists().then_some(local)
}

/// Resolves and loads the configuration. An explicitly named file that does
/// not exist is an error; with no file at all the defaults are used.
pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    match resolve_config_path(explicit) {
        Some(path) => {
            debug!("Loading configuration from {}", path.display());
            load_config(&path)
        }
        None => {
            debug!("No configuration file, using defaults");
            load_default_config()
        }
    }
}
