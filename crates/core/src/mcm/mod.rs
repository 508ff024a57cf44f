//! McM (Monte Carlo Management) queries for generator filter efficiencies.
//!
//! Filter efficiencies live on the wmLHEGEN/wmLHEGS request of a production
//! chain, not on the MiniAOD request users usually know. [`McmLookup`] walks
//! from a dataset to that request; [`McmClient`] talks to the REST API.

mod client;
mod config;
mod cookies;
mod efficiency;
mod lookup;
mod types;

pub use client::McmClient;
pub use config::{McmConfig, MCM_DEV_URL, MCM_PROD_URL};
pub use cookies::{default_cookie_files, load_cookies, parse_cookie_file, SsoCookie};
pub use efficiency::{extract_filter_efficiency, EfficiencyInfo};
pub use lookup::{
    find_wmlhe_in_chain, infer_wmlhe_prepid_from_chain, wmlhe_prepid_from_reqmgr, DatasetLookup,
    GeneratorStatus, McmLookup,
};
pub use types::{ChainReference, ChainedRequest, McmRequest};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to McM.
#[derive(Debug, Error)]
pub enum McmError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The API answered with something other than JSON, which is what the
    /// SSO login page looks like.
    #[error("Authentication failed (status {status}, content type '{content_type}'); check your CERN SSO cookie")]
    AuthenticationFailed { status: u16, content_type: String },

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Invalid McM base URL: {0}")]
    InvalidUrl(String),
}

/// Read access to McM requests.
#[async_trait]
pub trait McmApi: Send + Sync {
    /// Request by PrepID; `None` when McM has no such request.
    async fn get_request(&self, prepid: &str) -> Result<Option<McmRequest>, McmError>;

    /// Requests producing `dataset`.
    async fn search_requests(&self, dataset: &str) -> Result<Vec<McmRequest>, McmError>;

    /// Chained request by PrepID (authenticated API only).
    async fn get_chained_request(&self, prepid: &str)
        -> Result<Option<ChainedRequest>, McmError>;
}
