//! Terminal output formatting for dcost
//!
//! This crate provides table and JSON output formatters and the ASCII
//! spend chart used for breakdowns.

pub mod output;
pub mod spend_chart;

pub use output::{JsonFormatter, OutputFormatter, TableFormatter, get_formatter};
pub use spend_chart::SpendChart;
