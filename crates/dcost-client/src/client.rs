//! HTTP record source for the cost service
//!
//! One GET per query against `<base>/asset` or `<base>/allocation`, carrying
//! the query parameters and an `X-Authorization` header. No retries and no
//! timeout beyond the transport default: a failed request fails the pass.

use async_trait::async_trait;
use dcost_core::error::{DcostError, Result};
use dcost_core::query::{CostQuery, Endpoint};
use dcost_core::source::{RecordSource, TokenProvider, check_token};
use dcost_core::types::{AllocationRecord, AssetRecord, CostResponse};
use reqwest::Url;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, info};

/// Header carrying the platform token
pub const AUTH_HEADER: &str = "X-Authorization";

/// Upstream error bodies are cut to this many characters
const MAX_ERROR_BODY: usize = 512;

/// Client for the asset and allocation endpoints
#[derive(Clone)]
pub struct CostClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl CostClient {
    /// Create a client for the cost service at `base_url`
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, tokens)
    }

    /// Create a client sharing an existing HTTP client
    pub fn with_client(
        http: reqwest::Client,
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            http,
            base_url,
            tokens,
        }
    }

    /// Base URL of the cost service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full request URL for a query, parameters included
    pub fn request_url(&self, query: &CostQuery) -> Result<Url> {
        let endpoint = format!("{}/{}", self.base_url, query.endpoint.path());
        Url::parse_with_params(&endpoint, query.to_params())
            .map_err(|e| DcostError::Config(format!("Invalid cost service URL '{endpoint}': {e}")))
    }

    async fn get_records<T: DeserializeOwned>(&self, query: &CostQuery) -> Result<Vec<T>> {
        let token = check_token(self.tokens.token().await?)?;
        let url = self.request_url(query)?;

        info!(
            endpoint = %query.endpoint,
            window = %query.window,
            aggregate = %query.aggregate.to_param(),
            filter = query.filter.as_deref().unwrap_or(""),
            "Querying cost service"
        );

        let response = self
            .http
            .get(url)
            .header(AUTH_HEADER, token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(DcostError::UpstreamRequestFailed {
                endpoint: format!("{}/{}", self.base_url, query.endpoint.path()),
                status: status.as_u16(),
                body,
            });
        }

        let envelope: CostResponse<T> = response.json().await?;
        let records = envelope.into_records();
        debug!(
            "Received {} records from {}",
            records.len(),
            query.endpoint
        );
        Ok(records)
    }

    fn expect_endpoint(query: &CostQuery, expected: Endpoint) -> Result<()> {
        if query.endpoint == expected {
            Ok(())
        } else {
            Err(DcostError::InvalidArgument(format!(
                "query targets the {} endpoint, expected {expected}",
                query.endpoint
            )))
        }
    }
}

#[async_trait]
impl RecordSource for CostClient {
    async fn fetch_assets(&self, query: &CostQuery) -> Result<Vec<AssetRecord>> {
        Self::expect_endpoint(query, Endpoint::Asset)?;
        self.get_records(query).await
    }

    async fn fetch_allocations(&self, query: &CostQuery) -> Result<Vec<AllocationRecord>> {
        Self::expect_endpoint(query, Endpoint::Allocation)?;
        self.get_records(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticTokenProvider;
    use dcost_core::filters::FilterState;
    use dcost_core::types::{BreakdownDimension, TimeWindow};
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, token: &str) -> CostClient {
        CostClient::new(server.uri(), Arc::new(StaticTokenProvider::new(token)))
    }

    #[test]
    fn test_request_url_encodes_filter() {
        let client = CostClient::new(
            "http://domino-cost.platform:9000/",
            Arc::new(StaticTokenProvider::new("t")),
        );
        let mut state = FilterState::new();
        state.set(BreakdownDimension::Project, "My Project");
        let url = client
            .request_url(&CostQuery::top_level(TimeWindow::Today, state.to_query_fragment()))
            .unwrap();

        assert_eq!(url.path(), "/asset");
        let filter = url
            .query_pairs()
            .find(|(k, _)| k == "filter")
            .map(|(_, v)| v.into_owned());
        assert_eq!(
            filter.as_deref(),
            Some(r#"label[dominodatalab_com_project_name]:"My Project""#)
        );
    }

    #[tokio::test]
    async fn test_fetch_assets_sends_params_and_auth() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/asset"))
            .and(query_param("window", "lastweek"))
            .and(query_param("aggregate", "category"))
            .and(query_param("accumulate", "true"))
            .and(query_param_is_missing("filter"))
            .and(header(AUTH_HEADER, "tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": 200,
                "data": [
                    {"type": "Node", "totalCost": 10.5},
                    {"type": "Disk", "totalCost": 1.25}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, "tok");
        let assets = client
            .fetch_assets(&CostQuery::top_level(TimeWindow::LastWeek, None))
            .await
            .unwrap();

        assert_eq!(assets.len(), 2);
        assert_eq!(assets[0].category, "Node");
        assert_eq!(assets[1].cost(), 1.25);
    }

    #[tokio::test]
    async fn test_fetch_allocations_skips_nulls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/allocation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [
                    null,
                    {
                        "name": "org1",
                        "window": {"start": "2023-04-28T00:00:00Z", "end": "2023-04-28T00:05:00Z"},
                        "cpuCost": 1.0
                    }
                ]
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, "tok");
        let records = client
            .fetch_allocations(&CostQuery::daily(TimeWindow::Last30Days, None))
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "org1");
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/allocation"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client_for(&server, "tok");
        let err = client
            .fetch_allocations(&CostQuery::detail(TimeWindow::Today, None))
            .await
            .unwrap_err();

        match err {
            DcostError::UpstreamRequestFailed { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_anonymous_token_never_reaches_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server, "AnonymousUser");
        let err = client
            .fetch_assets(&CostQuery::top_level(TimeWindow::Today, None))
            .await
            .unwrap_err();
        assert!(matches!(err, DcostError::AuthenticationExpired));
    }

    #[tokio::test]
    async fn test_endpoint_mismatch_is_rejected() {
        let server = MockServer::start().await;
        let client = client_for(&server, "tok");
        let err = client
            .fetch_assets(&CostQuery::detail(TimeWindow::Today, None))
            .await
            .unwrap_err();
        assert!(matches!(err, DcostError::InvalidArgument(_)));
    }
}
