//! Upstream query parameters
//!
//! Every request to the cost service is described by a [`CostQuery`]; the
//! constructors here are the only place the three report queries and the
//! organization listing are shaped.

use crate::labels::{self, DETAIL_LABELS, ORGANIZATION_LABEL};
use crate::types::TimeWindow;
use serde::Serialize;
use std::fmt;

/// Logical endpoint of the cost service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endpoint {
    /// Cost by resource category
    Asset,
    /// Cost by workload, with composite label names
    Allocation,
}

impl Endpoint {
    /// Path segment under the service base URL
    pub fn path(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Allocation => "allocation",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Grouping requested from the endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Aggregate {
    /// Group assets by resource category
    Category,
    /// Group allocations by these labels, in this order
    Labels(Vec<&'static str>),
}

impl Aggregate {
    /// Value of the `aggregate` parameter
    pub fn to_param(&self) -> String {
        match self {
            Self::Category => "category".to_string(),
            Self::Labels(list) => labels::aggregate_param(list),
        }
    }
}

/// A single parameterized request against one endpoint
///
/// # Examples
/// ```
/// use dcost_core::query::{CostQuery, Endpoint};
/// use dcost_core::types::TimeWindow;
///
/// let query = CostQuery::top_level(TimeWindow::LastWeek, None);
/// assert_eq!(query.endpoint, Endpoint::Asset);
/// assert_eq!(
///     query.to_params(),
///     vec![
///         ("window", "lastweek".to_string()),
///         ("aggregate", "category".to_string()),
///         ("accumulate", "true".to_string()),
///     ]
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CostQuery {
    pub endpoint: Endpoint,
    pub window: TimeWindow,
    pub aggregate: Aggregate,
    pub accumulate: bool,
    pub filter: Option<String>,
}

impl CostQuery {
    /// Asset totals by category, accumulated over the window
    pub fn top_level(window: TimeWindow, filter: Option<String>) -> Self {
        Self {
            endpoint: Endpoint::Asset,
            window,
            aggregate: Aggregate::Category,
            accumulate: true,
            filter,
        }
    }

    /// Time-sliced allocation totals per organization, input of the daily series
    pub fn daily(window: TimeWindow, filter: Option<String>) -> Self {
        Self {
            endpoint: Endpoint::Allocation,
            window,
            aggregate: Aggregate::Labels(vec![ORGANIZATION_LABEL]),
            accumulate: false,
            filter,
        }
    }

    /// Allocation totals by the full label set, shared by breakdowns and executions
    pub fn detail(window: TimeWindow, filter: Option<String>) -> Self {
        Self {
            endpoint: Endpoint::Allocation,
            window,
            aggregate: Aggregate::Labels(DETAIL_LABELS.to_vec()),
            accumulate: true,
            filter,
        }
    }

    /// Unfiltered organization list over the last 30 days
    pub fn organizations() -> Self {
        Self {
            endpoint: Endpoint::Allocation,
            window: TimeWindow::Last30Days,
            aggregate: Aggregate::Labels(vec![ORGANIZATION_LABEL]),
            accumulate: true,
            filter: None,
        }
    }

    /// Query-string pairs, `filter` only when a selection is active
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("window", self.window.token().to_string()),
            ("aggregate", self.aggregate.to_param()),
            ("accumulate", self.accumulate.to_string()),
        ];
        if let Some(filter) = &self.filter {
            params.push(("filter", filter.clone()));
        }
        params
    }
}
