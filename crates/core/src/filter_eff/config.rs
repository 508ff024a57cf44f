//! Filter efficiency configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::types::Era;

/// Where sample lists and the analyzer live, and how long each external tool
/// may run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterEffConfig {
    /// Analysis checkout containing `SampleLists/` and `FilterEff/`.
    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,
    #[serde(default = "default_das_timeout_secs")]
    pub das_timeout_secs: u64,
    #[serde(default = "default_cmsrun_timeout_secs")]
    pub cmsrun_timeout_secs: u64,
    /// Worker count when `--jobs` is not given.
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_das_timeout_secs() -> u64 {
    300
}

fn default_cmsrun_timeout_secs() -> u64 {
    7200
}

fn default_jobs() -> usize {
    1
}

impl Default for FilterEffConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            das_timeout_secs: default_das_timeout_secs(),
            cmsrun_timeout_secs: default_cmsrun_timeout_secs(),
            jobs: default_jobs(),
        }
    }
}

impl FilterEffConfig {
    pub fn sample_list_path(&self, era: Era) -> PathBuf {
        self.base_dir
            .join("SampleLists")
            .join(format!("SignalMC_{}.txt", era))
    }

    pub fn output_dir(&self) -> PathBuf {
        self.base_dir.join("FilterEff")
    }

    /// GenXsecAnalyzer configuration run by `cmsRun`.
    pub fn analyzer_config(&self) -> PathBuf {
        self.output_dir().join("ana.py")
    }

    pub fn era_results_path(&self, era: Era) -> PathBuf {
        self.output_dir().join(format!("results_{}.json", era))
    }

    pub fn sample_results_path(&self, process: &str) -> PathBuf {
        self.output_dir().join(format!("sample_{}.json", process))
    }

    pub fn das_timeout(&self) -> Duration {
        Duration::from_secs(self.das_timeout_secs)
    }

    pub fn cmsrun_timeout(&self) -> Duration {
        Duration::from_secs(self.cmsrun_timeout_secs)
    }

    /// Same settings rooted at another directory.
    pub fn with_base_dir(mut self, base_dir: impl AsRef<Path>) -> Self {
        self.base_dir = base_dir.as_ref().to_path_buf();
        self
    }
}
