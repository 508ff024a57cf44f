//! McM REST client.
//!
//! Every lookup tries the public API first. The authenticated API needs a
//! CERN SSO cookie; without one McM redirects to the login page, which shows
//! up here as a non-JSON response.

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, Url};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::config::McmConfig;
use super::cookies::{default_cookie_files, load_cookies};
use super::types::{ChainedRequest, McmRequest};
use super::{McmApi, McmError};

pub struct McmClient {
    client: Client,
    base_url: String,
    authenticated: bool,
}

impl McmClient {
    pub fn new(config: &McmConfig) -> Result<Self, McmError> {
        let base_url = config.base_url();
        let url = Url::parse(&base_url).map_err(|e| McmError::InvalidUrl(e.to_string()))?;

        let candidates = config
            .cookie_files
            .clone()
            .unwrap_or_else(default_cookie_files);

        let jar = Jar::default();
        let authenticated = match load_cookies(&candidates) {
            Some((path, cookies)) => {
                for cookie in &cookies {
                    jar.add_cookie_str(&cookie.to_set_cookie(), &url);
                }
                info!("Using authentication cookie from: {}", path.display());
                true
            }
            None => {
                warn!(
                    "No CERN SSO cookie found. Some McM queries may fail. Create one with: \
                     auth-get-sso-cookie -u {} -o ~/.cern-sso-cookie.txt",
                    base_url
                );
                false
            }
        };

        let client = Client::builder()
            .user_agent(concat!("cmsprod/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout())
            .cookie_provider(Arc::new(jar))
            .build()?;

        Ok(Self {
            client,
            base_url,
            authenticated,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether an SSO cookie was loaded.
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// `results` of a public API call, or `None` for any kind of failure.
    async fn get_public(&self, path: &str) -> Option<Value> {
        let url = format!("{}/public/restapi/{}", self.base_url, path);
        debug!("McM public GET {}", url);

        let response = match self.client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("Public API failed: {}", e);
                return None;
            }
        };

        if !response.status().is_success() || !is_json(&response) {
            debug!("Public API answered {} for {}", response.status(), url);
            return None;
        }

        match response.json::<Value>().await {
            Ok(body) => results(body),
            Err(e) => {
                debug!("Public API returned invalid JSON: {}", e);
                None
            }
        }
    }

    /// `results` of an authenticated API call.
    async fn get_authenticated(&self, path: &str) -> Result<Option<Value>, McmError> {
        let url = format!("{}/restapi/{}", self.base_url, path);
        debug!("McM GET {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(McmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        if !is_json(&response) {
            return Err(McmError::AuthenticationFailed {
                status: status.as_u16(),
                content_type: content_type(&response),
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| McmError::ParseError(format!("Failed to parse response: {}", e)))?;
        Ok(results(body))
    }
}

fn content_type(response: &Response) -> String {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn is_json(response: &Response) -> bool {
    content_type(response).contains("application/json")
}

/// The `results` member, treating null, false and empty values as absent.
fn results(body: Value) -> Option<Value> {
    let Value::Object(mut body) = body else {
        return None;
    };
    match body.remove("results")? {
        Value::Null | Value::Bool(false) => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        Value::String(s) if s.is_empty() => None,
        other => Some(other),
    }
}

fn parse<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, McmError> {
    serde_json::from_value(value).map_err(|e| McmError::ParseError(e.to_string()))
}

fn parse_request_list(value: Value) -> Result<Vec<McmRequest>, McmError> {
    match value {
        Value::Array(items) => items.into_iter().map(parse).collect(),
        single @ Value::Object(_) => Ok(vec![parse(single)?]),
        other => Err(McmError::ParseError(format!(
            "unexpected results shape: {}",
            other
        ))),
    }
}

#[async_trait]
impl McmApi for McmClient {
    async fn get_request(&self, prepid: &str) -> Result<Option<McmRequest>, McmError> {
        info!("Fetching {} via public API", prepid);
        let path = format!("requests/get/{}", prepid);

        if let Some(value) = self.get_public(&path).await {
            return parse(value).map(Some);
        }

        match self.get_authenticated(&path).await? {
            Some(value) => parse(value).map(Some),
            None => {
                info!("No results found for PrepID: {}", prepid);
                Ok(None)
            }
        }
    }

    async fn search_requests(&self, dataset: &str) -> Result<Vec<McmRequest>, McmError> {
        let encoded = urlencoding::encode(dataset);
        if let Some(value) = self
            .get_public(&format!("requests/produces/{}", encoded))
            .await
        {
            return parse_request_list(value);
        }

        info!("Public API failed, trying authenticated API");
        match self
            .get_authenticated(&format!("requests/query?dataset_name={}", dataset))
            .await?
        {
            Some(value) => parse_request_list(value),
            None => {
                info!("No requests found for dataset: {}", dataset);
                Ok(Vec::new())
            }
        }
    }

    async fn get_chained_request(
        &self,
        prepid: &str,
    ) -> Result<Option<ChainedRequest>, McmError> {
        match self
            .get_authenticated(&format!("chained_requests/get/{}", prepid))
            .await?
        {
            Some(value) => parse(value).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_results_truthiness() {
        assert_eq!(results(json!({"results": {"prepid": "X"}})), Some(json!({"prepid": "X"})));
        assert_eq!(results(json!({"results": [1]})), Some(json!([1])));
        assert_eq!(results(json!({"results": []})), None);
        assert_eq!(results(json!({"results": {}})), None);
        assert_eq!(results(json!({"results": false})), None);
        assert_eq!(results(json!({"results": null})), None);
        assert_eq!(results(json!({"other": 1})), None);
        assert_eq!(results(json!([1, 2])), None);
    }

    #[test]
    fn test_parse_request_list_shapes() {
        let single = parse_request_list(json!({"prepid": "A"})).unwrap();
        assert_eq!(single.len(), 1);

        let many = parse_request_list(json!([{"prepid": "A"}, {"prepid": "B"}])).unwrap();
        assert_eq!(many[1].prepid, "B");

        assert!(parse_request_list(json!("nope")).is_err());
    }

    #[test]
    fn test_new_rejects_bad_url() {
        let config = McmConfig {
            base_url: Some("not a url".to_string()),
            cookie_files: Some(Vec::new()),
            ..Default::default()
        };
        assert!(matches!(McmClient::new(&config), Err(McmError::InvalidUrl(_))));
    }
}
