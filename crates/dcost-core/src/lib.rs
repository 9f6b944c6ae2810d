//! Core types, traits, and utilities for dcost
//!
//! This crate provides the record model, error handling, drill-down filter
//! state, query shapes, composite-key decoding, display helpers and the derived views used by
//! all other dcost crates.

pub mod error;
pub mod filters;
pub mod format;
pub mod labels;
pub mod query;
pub mod source;
pub mod timezone;
pub mod types;
pub mod views;

// Re-export commonly used types
pub use error::{DcostError, Result};
pub use filters::{FilterSelection, FilterState};
pub use query::{CostQuery, Endpoint};
pub use source::{RecordSource, TokenProvider};
pub use types::{AllocationRecord, AssetRecord, BreakdownDimension, CostWindow, TimeWindow};
pub use views::{
    CostBreakdown, CostSummary, DailyCostTable, DailyKey, Dashboard, ExecutionTable, SpendLimits,
};
