//! Concurrent fetch of one report pass
//!
//! The three queries of a pass (top-level, daily and full detail) run as
//! independent tokio tasks in a [`JoinSet`](tokio::task::JoinSet). The
//! first failure fails the pass and aborts the other tasks; partial results
//! are never handed on.
//!
//! # Examples
//!
//! ```no_run
//! use dcost::orchestrator::{DashboardSession, FetchOrchestrator};
//! use dcost_client::{CostClient, StaticTokenProvider};
//! use dcost_core::types::{BreakdownDimension, TimeWindow};
//! use dcost_core::views::SpendLimits;
//! use std::sync::Arc;
//!
//! # async fn example() -> dcost::Result<()> {
//! let client = CostClient::new(
//!     "http://domino-cost.domino-platform:9000",
//!     Arc::new(StaticTokenProvider::new("token")),
//! );
//! let orchestrator = FetchOrchestrator::new(Arc::new(client), chrono_tz::UTC);
//!
//! let mut session = DashboardSession::new(TimeWindow::LastWeek);
//! let next = session.drill_down(BreakdownDimension::Organization, "research");
//! assert_eq!(next, BreakdownDimension::Project);
//!
//! let dashboard = orchestrator.build_dashboard(&session, SpendLimits::default()).await?;
//! println!("{}", dashboard.summary.total());
//! # Ok(())
//! # }
//! ```

use crate::breakdown::aggregate_breakdown;
use crate::daily_rollup::rollup;
use crate::executions::build_execution_table;
use crate::summary::summarize;
use chrono_tz::Tz;
use dcost_core::error::{DcostError, Result};
use dcost_core::filters::FilterState;
use dcost_core::labels::is_sentinel;
use dcost_core::query::CostQuery;
use dcost_core::source::RecordSource;
use dcost_core::types::{AllocationRecord, AssetRecord, BreakdownDimension, TimeWindow};
use dcost_core::views::{Dashboard, SpendLimits};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Window and drill-down selection of one interactive session
///
/// The only state that outlives a pass. Each pass takes a snapshot through
/// [`FetchOrchestrator::build_dashboard`], so changing the selection while a
/// pass is in flight only affects the next one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardSession {
    pub window: TimeWindow,
    pub filter: FilterState,
}

impl DashboardSession {
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window,
            filter: FilterState::new(),
        }
    }

    pub fn with_filter(mut self, filter: FilterState) -> Self {
        self.filter = filter;
        self
    }

    pub fn set_window(&mut self, window: TimeWindow) {
        self.window = window;
    }

    /// Select a value of a breakdown, replacing any prior selection
    ///
    /// Returns the breakdown worth showing next.
    pub fn drill_down(
        &mut self,
        dimension: BreakdownDimension,
        value: impl Into<String>,
    ) -> BreakdownDimension {
        self.filter.set(dimension, value);
        dimension.next_after_drilldown()
    }

    /// Drop the drill-down selection
    pub fn clear_filter(&mut self) {
        self.filter.clear();
    }
}

/// Raw records of one pass
#[derive(Debug, Clone, Default)]
pub struct FetchResults {
    pub assets: Vec<AssetRecord>,
    pub daily: Vec<AllocationRecord>,
    pub detail: Vec<AllocationRecord>,
}

/// Output of one fetch task
enum Fetched {
    Assets(Vec<AssetRecord>),
    Daily(Vec<AllocationRecord>),
    Detail(Vec<AllocationRecord>),
}

/// Issues the queries of a pass and turns the records into views
pub struct FetchOrchestrator {
    source: Arc<dyn RecordSource>,
    timezone: Tz,
}

impl FetchOrchestrator {
    pub fn new(source: Arc<dyn RecordSource>, timezone: Tz) -> Self {
        Self { source, timezone }
    }

    pub fn timezone(&self) -> &Tz {
        &self.timezone
    }

    /// Run the three queries of a pass concurrently
    ///
    /// The filter is rendered once and shared by all three queries. The
    /// first failure aborts the queries still in flight.
    pub async fn fetch(&self, window: TimeWindow, filter: &FilterState) -> Result<FetchResults> {
        let fragment = filter.to_query_fragment();
        info!(
            "Fetching {} report{}",
            window,
            fragment
                .as_deref()
                .map(|f| format!(" with filter {f}"))
                .unwrap_or_default()
        );

        let mut tasks = JoinSet::new();
        {
            let source = Arc::clone(&self.source);
            let query = CostQuery::top_level(window, fragment.clone());
            tasks.spawn(async move { source.fetch_assets(&query).await.map(Fetched::Assets) });
        }
        {
            let source = Arc::clone(&self.source);
            let query = CostQuery::daily(window, fragment.clone());
            tasks.spawn(async move { source.fetch_allocations(&query).await.map(Fetched::Daily) });
        }
        {
            let source = Arc::clone(&self.source);
            let query = CostQuery::detail(window, fragment);
            tasks.spawn(async move { source.fetch_allocations(&query).await.map(Fetched::Detail) });
        }

        let mut results = FetchResults::default();
        while let Some(joined) = tasks.join_next().await {
            let fetched = match joined {
                Ok(Ok(fetched)) => fetched,
                Ok(Err(e)) => {
                    tasks.abort_all();
                    return Err(e);
                }
                Err(e) => {
                    tasks.abort_all();
                    return Err(DcostError::TaskFailed(e.to_string()));
                }
            };
            match fetched {
                Fetched::Assets(records) => results.assets = records,
                Fetched::Daily(records) => results.daily = records,
                Fetched::Detail(records) => results.detail = records,
            }
        }

        debug!(
            "Joined fetch: {} assets, {} daily records, {} detail records",
            results.assets.len(),
            results.daily.len(),
            results.detail.len()
        );
        Ok(results)
    }

    /// Aggregate fetched records into a dashboard
    pub fn aggregate(
        &self,
        window: TimeWindow,
        filter: &FilterState,
        limits: SpendLimits,
        results: &FetchResults,
    ) -> Result<Dashboard> {
        Ok(Dashboard {
            window,
            filter: filter.selection().cloned(),
            limits,
            summary: summarize(&results.assets),
            daily: rollup(&results.daily, window),
            breakdown: aggregate_breakdown(&results.detail)?,
            executions: build_execution_table(&results.detail, &self.timezone)?,
        })
    }

    /// Fetch and aggregate one pass for a session
    pub async fn build_dashboard(
        &self,
        session: &DashboardSession,
        limits: SpendLimits,
    ) -> Result<Dashboard> {
        let window = session.window;
        let filter = session.filter.clone();

        let results = self.fetch(window, &filter).await?;
        self.aggregate(window, &filter, limits, &results)
    }

    /// Organizations with spend over the last 30 days, in upstream order
    pub async fn organizations(&self) -> Result<Vec<String>> {
        let records = self
            .source
            .fetch_allocations(&CostQuery::organizations())
            .await?;

        let mut organizations: Vec<String> = Vec::with_capacity(records.len());
        for record in records {
            if is_sentinel(&record.name) || organizations.contains(&record.name) {
                continue;
            }
            organizations.push(record.name);
        }
        Ok(organizations)
    }
}
