//! Output formatting module for dcost
//!
//! This module provides formatters for displaying a report in different formats:
//! - Table format for human-readable terminal output
//! - JSON format for machine-readable output and integration with other tools
//!
//! # Examples
//!
//! ```
//! use dcost_terminal::output::get_formatter;
//! use dcost_core::views::{CategoryCost, CostSummary};
//!
//! let summary = CostSummary {
//!     categories: vec![CategoryCost { category: "Node".to_string(), cost: 12.5 }],
//! };
//!
//! let formatter = get_formatter(false);
//! assert!(formatter.format_summary(&summary).contains("$12.5"));
//!
//! let json_formatter = get_formatter(true);
//! assert!(json_formatter.format_summary(&summary).contains("\"total\""));
//! ```

use crate::spend_chart::SpendChart;
use dcost_core::format::format_currency;
use dcost_core::views::{
    CostBreakdown, CostSummary, DailyCostTable, Dashboard, ExecutionTable, SpendLimits,
};
use prettytable::{Cell, Row, Table, format, row};
use serde_json::{Value, json};

/// Title of the report
pub const REPORT_TITLE: &str = "Cost Analysis";

/// Trait for output formatters
///
/// Each method renders one section of a report; [`format_dashboard`]
/// renders all of them together.
///
/// [`format_dashboard`]: OutputFormatter::format_dashboard
pub trait OutputFormatter {
    /// Format the per-category summary, total first
    fn format_summary(&self, summary: &CostSummary) -> String;

    /// Format the cumulative daily series
    fn format_daily(&self, daily: &DailyCostTable) -> String;

    /// Format project, user and organization breakdowns
    fn format_breakdown(&self, breakdown: &CostBreakdown, limits: &SpendLimits) -> String;

    /// Format the execution table
    fn format_executions(&self, executions: &ExecutionTable) -> String;

    /// Format a complete report
    fn format_dashboard(&self, dashboard: &Dashboard) -> String;

    /// Format the organization listing
    fn format_organizations(&self, organizations: &[String]) -> String;
}

/// Table formatter for human-readable output
pub struct TableFormatter {
    chart: SpendChart,
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            chart: SpendChart::default(),
        }
    }

    /// Use a specific chart renderer, e.g. a plain one for tests
    pub fn with_chart(chart: SpendChart) -> Self {
        Self { chart }
    }

    fn new_table() -> Table {
        let mut table = Table::new();
        table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
        table
    }

    fn section(title: &str, body: &str) -> String {
        format!("\n=== {title} ===\n{body}")
    }
}

impl OutputFormatter for TableFormatter {
    fn format_summary(&self, summary: &CostSummary) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Category", b -> "Cost"]);

        table.add_row(row![b -> "Total", br -> format_currency(summary.total())]);
        for category in &summary.categories {
            table.add_row(row![category.category, r -> format_currency(category.cost)]);
        }

        table.to_string()
    }

    fn format_daily(&self, daily: &DailyCostTable) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![
            b -> "Date",
            b -> "CPU",
            b -> "GPU",
            b -> "Storage"
        ]);

        for point in &daily.points {
            table.add_row(row![
                point.key,
                r -> format_currency(point.cpu),
                r -> format_currency(point.gpu),
                r -> format_currency(point.storage)
            ]);
        }

        let mut output = table.to_string();
        if let Some((start, end)) = daily.axis_bounds() {
            output.push_str(&format!("Range: {start} .. {end}\n"));
        }
        output
    }

    fn format_breakdown(&self, breakdown: &CostBreakdown, limits: &SpendLimits) -> String {
        let mut output = String::new();

        for dimension in [
            &breakdown.projects,
            &breakdown.users,
            &breakdown.organizations,
        ] {
            let limit = limits.for_dimension(dimension.dimension);

            let mut table = Self::new_table();
            table.set_titles(row![
                b -> dimension.dimension.title(),
                b -> "Cost",
                b -> "Over Limit"
            ]);
            for bar in dimension.bars(limit) {
                let over = if bar.overflow > 0.0 {
                    format_currency(bar.overflow)
                } else {
                    "-".to_string()
                };
                table.add_row(row![bar.label, r -> format_currency(bar.cost), r -> over]);
            }
            if dimension.is_empty() {
                table.add_row(Row::new(vec![Cell::new("(none)"), Cell::new(""), Cell::new("")]));
            }

            output.push_str(&table.to_string());
            output.push('\n');
            output.push_str(&self.chart.render(dimension, limit));
            output.push('\n');
        }

        output
    }

    fn format_executions(&self, executions: &ExecutionTable) -> String {
        let mut table = Self::new_table();
        table.set_titles(Row::new(
            ExecutionTable::COLUMNS
                .iter()
                .map(|column| Cell::new(column).style_spec("b"))
                .collect(),
        ));

        for execution in &executions.rows {
            table.add_row(row![
                execution.workload_type,
                execution.user,
                execution.start,
                execution.end,
                r -> execution.cpu_cost,
                r -> execution.gpu_cost,
                r -> execution.compute_cost,
                r -> execution.storage_cost,
                execution.project_id
            ]);
        }

        table.to_string()
    }

    fn format_dashboard(&self, dashboard: &Dashboard) -> String {
        let mut output = format!("{REPORT_TITLE} ({})\n", dashboard.window.label());
        if let Some(filter) = &dashboard.filter {
            output.push_str(&format!("Filter: {filter}\n"));
        }

        output.push_str(&Self::section(
            "Top-level",
            &self.format_summary(&dashboard.summary),
        ));
        output.push_str(&Self::section("Daily", &self.format_daily(&dashboard.daily)));
        output.push_str(&Self::section(
            "Breakdowns",
            &self.format_breakdown(&dashboard.breakdown, &dashboard.limits),
        ));
        output.push_str(&Self::section(
            "Executions",
            &self.format_executions(&dashboard.executions),
        ));
        output
    }

    fn format_organizations(&self, organizations: &[String]) -> String {
        let mut table = Self::new_table();
        table.set_titles(row![b -> "Organization"]);
        for organization in organizations {
            table.add_row(row![organization]);
        }
        table.to_string()
    }
}

/// JSON formatter for machine-readable output
pub struct JsonFormatter;

impl JsonFormatter {
    /// Total plus categories as an array, so first-seen order survives and a
    /// category named "Total" cannot collide with the computed total
    fn summary_value(summary: &CostSummary) -> Value {
        json!({
            "total": summary.total(),
            "categories": summary.categories,
        })
    }

    fn daily_value(daily: &DailyCostTable) -> Value {
        json!(
            daily
                .points
                .iter()
                .map(|p| json!({
                    "key": p.key.to_string(),
                    "cpu": p.cpu,
                    "gpu": p.gpu,
                    "storage": p.storage,
                }))
                .collect::<Vec<_>>()
        )
    }

    /// One object per dimension, in project, user, organization order
    fn breakdown_value(breakdown: &CostBreakdown, limits: &SpendLimits) -> Value {
        json!(
            [&breakdown.projects, &breakdown.users, &breakdown.organizations]
                .into_iter()
                .map(|dimension| {
                    let limit = limits.for_dimension(dimension.dimension);
                    json!({
                        "dimension": dimension.dimension,
                        "limit": limit,
                        "entries": dimension.bars(limit),
                    })
                })
                .collect::<Vec<_>>()
        )
    }

    fn render(value: &Value) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize JSON output: {e}");
            String::from("{}")
        })
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_summary(&self, summary: &CostSummary) -> String {
        Self::render(&json!({ "summary": Self::summary_value(summary) }))
    }

    fn format_daily(&self, daily: &DailyCostTable) -> String {
        Self::render(&json!({ "daily": Self::daily_value(daily) }))
    }

    fn format_breakdown(&self, breakdown: &CostBreakdown, limits: &SpendLimits) -> String {
        Self::render(&json!({ "breakdown": Self::breakdown_value(breakdown, limits) }))
    }

    fn format_executions(&self, executions: &ExecutionTable) -> String {
        Self::render(&json!({ "executions": executions.rows }))
    }

    fn format_dashboard(&self, dashboard: &Dashboard) -> String {
        Self::render(&json!({
            "window": dashboard.window,
            "filter": dashboard.filter.as_ref().map(|f| json!({
                "dimension": f.dimension,
                "value": f.value,
            })),
            "summary": Self::summary_value(&dashboard.summary),
            "daily": Self::daily_value(&dashboard.daily),
            "breakdown": Self::breakdown_value(&dashboard.breakdown, &dashboard.limits),
            "executions": dashboard.executions.rows,
        }))
    }

    fn format_organizations(&self, organizations: &[String]) -> String {
        Self::render(&json!({ "organizations": organizations }))
    }
}

/// Pick a formatter for the requested output mode
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(TableFormatter::new())
    }
}
