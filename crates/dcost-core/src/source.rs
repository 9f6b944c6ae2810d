//! Traits for the record source and token provider
//!
//! The report pipeline only talks to the cost service through
//! [`RecordSource`], so aggregation and orchestration can be exercised with
//! in-memory sources in tests.

use crate::error::{DcostError, Result};
use crate::query::CostQuery;
use crate::types::{AllocationRecord, AssetRecord};
use async_trait::async_trait;

/// Token value the API proxy returns for unauthenticated callers
pub const ANONYMOUS_TOKEN: &str = "AnonymousUser";

/// Source of raw cost records
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Run a query against the asset endpoint
    async fn fetch_assets(&self, query: &CostQuery) -> Result<Vec<AssetRecord>>;

    /// Run a query against the allocation endpoint
    async fn fetch_allocations(&self, query: &CostQuery) -> Result<Vec<AllocationRecord>>;
}

/// Supplier of the authorization header value
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Fetch the current token, unvalidated
    async fn token(&self) -> Result<String>;
}

/// Reject the anonymous sentinel and surrounding whitespace
///
/// ```
/// use dcost_core::source::check_token;
///
/// assert_eq!(check_token(" abc\n".to_string()).unwrap(), "abc");
/// assert!(check_token("AnonymousUser".to_string()).is_err());
/// ```
pub fn check_token(token: String) -> Result<String> {
    let trimmed = token.trim();
    if trimmed == ANONYMOUS_TOKEN {
        return Err(DcostError::AuthenticationExpired);
    }
    Ok(trimmed.to_string())
}
