//! dcost - Aggregate and report compute platform spend
//!
//! This library provides functionality to:
//! - Fetch asset and allocation records from the cost service concurrently
//! - Sum top-level cost per resource category
//! - Re-derive a cumulative daily series per cost class
//! - Break spend down by project, user and organization
//! - Build the per-workload execution table
//! - Apply a single drill-down filter to every query of a pass
//!
//! # Examples
//!
//! ```no_run
//! use dcost::orchestrator::{DashboardSession, FetchOrchestrator};
//! use dcost_client::{CostClient, HttpTokenProvider};
//! use dcost_core::types::TimeWindow;
//! use dcost_core::views::SpendLimits;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> dcost::Result<()> {
//!     let tokens = Arc::new(HttpTokenProvider::new("http://localhost:8899"));
//!     let client = CostClient::new("http://domino-cost.domino-platform:9000", tokens);
//!     let orchestrator = FetchOrchestrator::new(Arc::new(client), chrono_tz::UTC);
//!
//!     let session = DashboardSession::new(TimeWindow::Last14Days);
//!     let dashboard = orchestrator.build_dashboard(&session, SpendLimits::default()).await?;
//!     println!("Total: {}", dashboard.summary.total());
//!     Ok(())
//! }
//! ```

pub mod breakdown;
pub mod cli;
pub mod config;
pub mod daily_rollup;
pub mod executions;
pub mod live_monitor;
pub mod orchestrator;
pub mod summary;

// Re-export commonly used types
pub use dcost_core::error::{DcostError, Result};
pub use dcost_core::filters::{FilterSelection, FilterState};
pub use dcost_core::types::{BreakdownDimension, TimeWindow};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
