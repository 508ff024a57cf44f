//! Mock McM API for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::mcm::{ChainedRequest, McmApi, McmError, McmRequest};

/// Mock implementation of the McmApi trait.
///
/// Serves requests, search results and chains from in-memory maps and
/// records every call as `"<method>:<key>"`.
#[derive(Debug, Clone, Default)]
pub struct MockMcm {
    requests: Arc<RwLock<HashMap<String, McmRequest>>>,
    searches: Arc<RwLock<HashMap<String, Vec<McmRequest>>>>,
    chains: Arc<RwLock<HashMap<String, ChainedRequest>>>,
    failing: Arc<RwLock<Vec<String>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockMcm {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_request(&self, request: McmRequest) {
        self.requests
            .write()
            .await
            .insert(request.prepid.clone(), request);
    }

    pub async fn set_search_results(&self, dataset: &str, results: Vec<McmRequest>) {
        self.searches
            .write()
            .await
            .insert(dataset.to_string(), results);
    }

    pub async fn add_chain(&self, prepid: &str, chain: Vec<&str>) {
        self.chains.write().await.insert(
            prepid.to_string(),
            ChainedRequest {
                prepid: prepid.to_string(),
                chain: chain.into_iter().map(str::to_string).collect(),
            },
        );
    }

    /// Makes every call whose key equals `key` fail as an authentication error.
    pub async fn fail_on(&self, key: &str) {
        self.failing.write().await.push(key.to_string());
    }

    pub async fn recorded_calls(&self) -> Vec<String> {
        self.calls.read().await.clone()
    }

    async fn record(&self, method: &str, key: &str) -> Result<(), McmError> {
        self.calls.write().await.push(format!("{}:{}", method, key));
        if self.failing.read().await.iter().any(|k| k == key) {
            return Err(McmError::AuthenticationFailed {
                status: 200,
                content_type: "text/html".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl McmApi for MockMcm {
    async fn get_request(&self, prepid: &str) -> Result<Option<McmRequest>, McmError> {
        self.record("get_request", prepid).await?;
        Ok(self.requests.read().await.get(prepid).cloned())
    }

    async fn search_requests(&self, dataset: &str) -> Result<Vec<McmRequest>, McmError> {
        self.record("search_requests", dataset).await?;
        Ok(self
            .searches
            .read()
            .await
            .get(dataset)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_chained_request(
        &self,
        prepid: &str,
    ) -> Result<Option<ChainedRequest>, McmError> {
        self.record("get_chained_request", prepid).await?;
        Ok(self.chains.read().await.get(prepid).cloned())
    }
}
