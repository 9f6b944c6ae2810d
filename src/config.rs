//! Runtime configuration resolved from CLI flags and environment
//!
//! The cost service lives at `http://domino-cost.<namespace>:9000`, where
//! the namespace is the last DNS label of the platform API host. An explicit
//! `--cost-url` skips the lookup.

use crate::cli::Cli;
use dcost_client::{CostClient, HttpTokenProvider, StaticTokenProvider};
use dcost_core::error::{DcostError, Result};
use dcost_core::source::{RecordSource, TokenProvider};
use dcost_core::timezone::TimezoneConfig;
use dcost_core::views::SpendLimits;
use reqwest::Url;
use std::sync::Arc;
use tracing::debug;

/// Port the cost service listens on
pub const COST_SERVICE_PORT: u16 = 9000;

/// Where authorization tokens come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// A fixed token
    Static(String),
    /// Fetched from the API proxy before every request
    Proxy(String),
}

/// Validated configuration for one run
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub cost_url: String,
    pub token_source: TokenSource,
    pub limits: SpendLimits,
    pub timezone: TimezoneConfig,
}

impl AppConfig {
    /// Resolve the configuration from parsed CLI arguments
    ///
    /// # Errors
    ///
    /// Returns `DcostError::Config` when neither a cost URL nor an API host
    /// is available, when no token source is configured, or when a URL or
    /// spend limit is invalid.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let cost_url = match (&cli.cost_url, &cli.api_host) {
            (Some(url), _) => {
                Url::parse(url)
                    .map_err(|e| DcostError::Config(format!("Invalid cost URL '{url}': {e}")))?;
                url.trim_end_matches('/').to_string()
            }
            (None, Some(host)) => cost_service_url(&namespace_from_host(host)?),
            (None, None) => {
                return Err(DcostError::Config(
                    "Set DOMINO_API_HOST (or --api-host) or DOMINO_COST_URL (or --cost-url)"
                        .to_string(),
                ));
            }
        };

        let token_source = match (&cli.token, &cli.api_proxy) {
            (Some(token), _) => TokenSource::Static(token.clone()),
            (None, Some(proxy)) => {
                Url::parse(proxy).map_err(|e| {
                    DcostError::Config(format!("Invalid API proxy URL '{proxy}': {e}"))
                })?;
                TokenSource::Proxy(proxy.clone())
            }
            (None, None) => {
                return Err(DcostError::Config(
                    "Set DOMINO_API_PROXY (or --api-proxy) or DOMINO_API_TOKEN (or --token)"
                        .to_string(),
                ));
            }
        };

        let limits = SpendLimits {
            project: Some(validate_limit("project", cli.project_max_spend)?),
            organization: Some(validate_limit("organization", cli.org_max_spend)?),
        };

        let timezone = TimezoneConfig::from_cli(cli.timezone.as_deref(), cli.utc)?;

        debug!("Cost service at {cost_url}");
        Ok(Self {
            cost_url,
            token_source,
            limits,
            timezone,
        })
    }

    /// Token provider for the configured source
    pub fn token_provider(&self) -> Arc<dyn TokenProvider> {
        match &self.token_source {
            TokenSource::Static(token) => Arc::new(StaticTokenProvider::new(token.clone())),
            TokenSource::Proxy(proxy) => Arc::new(HttpTokenProvider::new(proxy)),
        }
    }

    /// Record source for the cost service
    pub fn record_source(&self) -> Arc<dyn RecordSource> {
        Arc::new(CostClient::new(self.cost_url.clone(), self.token_provider()))
    }
}

fn validate_limit(name: &str, value: f64) -> Result<f64> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(DcostError::Config(format!(
            "Invalid {name} spend limit {value}: must be a non-negative amount"
        )))
    }
}

/// Platform namespace: the last DNS label of the API host
///
/// ```
/// use dcost::config::namespace_from_host;
///
/// assert_eq!(
///     namespace_from_host("http://nucleus-frontend.domino-platform:80").unwrap(),
///     "domino-platform"
/// );
/// assert!(namespace_from_host("not a url").is_err());
/// ```
pub fn namespace_from_host(api_host: &str) -> Result<String> {
    let url = Url::parse(api_host)
        .map_err(|e| DcostError::Config(format!("Invalid API host '{api_host}': {e}")))?;
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| DcostError::Config(format!("API host '{api_host}' has no host name")))?;

    host.rsplit('.')
        .next()
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            DcostError::Config(format!("Cannot derive a namespace from API host '{api_host}'"))
        })
}

/// Base URL of the cost service in a namespace
pub fn cost_service_url(namespace: &str) -> String {
    format!("http://domino-cost.{namespace}:{COST_SERVICE_PORT}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_lookup() {
        assert_eq!(
            namespace_from_host("https://nucleus-frontend.team-a.svc:443/path").unwrap(),
            "svc"
        );
        assert_eq!(namespace_from_host("http://frontend:80").unwrap(), "frontend");
        assert!(namespace_from_host("mailto:someone").is_err());
    }

    #[test]
    fn test_cost_service_url() {
        assert_eq!(
            cost_service_url("domino-platform"),
            "http://domino-cost.domino-platform:9000"
        );
    }

    #[test]
    fn test_validate_limit() {
        assert_eq!(validate_limit("project", 8.0).unwrap(), 8.0);
        assert!(validate_limit("project", -1.0).is_err());
        assert!(validate_limit("project", f64::NAN).is_err());
    }
}
