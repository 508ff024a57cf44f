use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const MCM_PROD_URL: &str = "https://cms-pdmv.cern.ch/mcm";
pub const MCM_DEV_URL: &str = "https://cms-pdmv-dev.cern.ch/mcm";

/// McM client configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McmConfig {
    /// Use the development instance.
    #[serde(default)]
    pub dev: bool,
    /// Overrides both instance URLs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Cookie files to try in order; the CERN SSO defaults under `$HOME`
    /// when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cookie_files: Option<Vec<PathBuf>>,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for McmConfig {
    fn default() -> Self {
        Self {
            dev: false,
            base_url: None,
            timeout_secs: default_timeout_secs(),
            cookie_files: None,
        }
    }
}

impl McmConfig {
    pub fn base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None if self.dev => MCM_DEV_URL.to_string(),
            None => MCM_PROD_URL.to_string(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
