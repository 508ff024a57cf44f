pub mod crab;
pub mod filter_eff;
pub mod mcm;
pub mod nano;

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

use cmsprod_core::{validate_config, Config};

/// Loads and validates the configuration for a command.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let config = cmsprod_core::load(explicit).context("Failed to load configuration")?;
    validate_config(&config).context("Configuration validation failed")?;
    debug!("Configuration loaded");
    Ok(config)
}
