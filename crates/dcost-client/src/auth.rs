//! Token providers for the cost service's authorization header

use async_trait::async_trait;
use dcost_core::error::{DcostError, Result};
use dcost_core::source::TokenProvider;
use tracing::debug;

/// Path of the token endpoint under the API proxy
pub const AUTHENTICATE_PATH: &str = "/account/auth/service/authenticate";

/// Fetches a token from the platform API proxy on every call
///
/// Tokens are not cached; each request to the cost service asks the proxy
/// for a fresh one.
pub struct HttpTokenProvider {
    client: reqwest::Client,
    url: String,
}

impl HttpTokenProvider {
    /// Create a provider for the given API proxy base URL
    pub fn new(api_proxy: &str) -> Self {
        Self::with_client(reqwest::Client::new(), api_proxy)
    }

    /// Create a provider sharing an existing HTTP client
    pub fn with_client(client: reqwest::Client, api_proxy: &str) -> Self {
        let url = format!("{}{AUTHENTICATE_PATH}", api_proxy.trim_end_matches('/'));
        Self { client, url }
    }

    /// Token endpoint URL
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl TokenProvider for HttpTokenProvider {
    async fn token(&self) -> Result<String> {
        debug!("Requesting token from {}", self.url);
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DcostError::UpstreamRequestFailed {
                endpoint: self.url.clone(),
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(response.text().await?)
    }
}

/// Fixed token, e.g. from `DOMINO_API_TOKEN`
pub struct StaticTokenProvider(String);

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}
