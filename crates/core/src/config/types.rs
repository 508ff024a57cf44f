use serde::{Deserialize, Serialize};

use crate::filter_eff::FilterEffConfig;
use crate::mcm::McmConfig;
use crate::workflow::WorkflowConfig;

/// Paths of the external programs. Bare names are looked up on `PATH`, which
/// inside a CMSSW environment (`cmsenv`) is where they live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_cms_driver")]
    pub cms_driver: String,
    #[serde(default = "default_cms_run")]
    pub cms_run: String,
    #[serde(default = "default_nano_postproc")]
    pub nano_postproc: String,
    #[serde(default = "default_dasgoclient")]
    pub dasgoclient: String,
    #[serde(default = "default_crab")]
    pub crab: String,
}

fn default_cms_driver() -> String {
    "cmsDriver.py".to_string()
}

fn default_cms_run() -> String {
    "cmsRun".to_string()
}

fn default_nano_postproc() -> String {
    "nano_postproc.py".to_string()
}

fn default_dasgoclient() -> String {
    "dasgoclient".to_string()
}

fn default_crab() -> String {
    "crab".to_string()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            cms_driver: default_cms_driver(),
            cms_run: default_cms_run(),
            nano_postproc: default_nano_postproc(),
            dasgoclient: default_dasgoclient(),
            crab: default_crab(),
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
    #[serde(default)]
    pub filter_eff: FilterEffConfig,
    #[serde(default)]
    pub mcm: McmConfig,
}
