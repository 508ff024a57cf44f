//! Error types for the crab module.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CrabError {
    #[error("Cannot read projects directory {path}: {source}")]
    ProjectsDirUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No crab_* task directories in {path}")]
    NoTasks { path: PathBuf },
}
