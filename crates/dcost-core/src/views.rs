//! Derived views handed to the presentation layer
//!
//! These are plain, serializable structures produced by the aggregators:
//! the top-level category summary, the cumulative daily series, the
//! per-dimension breakdowns and the execution table.

use crate::filters::FilterSelection;
use crate::format::round2;
use crate::types::{BreakdownDimension, TimeWindow};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Total cost of one resource category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCost {
    pub category: String,
    /// Rounded to 2 decimal places
    pub cost: f64,
}

/// Cost per resource category, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostSummary {
    pub categories: Vec<CategoryCost>,
}

impl CostSummary {
    /// Cost of one category
    pub fn get(&self, category: &str) -> Option<f64> {
        self.categories
            .iter()
            .find(|c| c.category == category)
            .map(|c| c.cost)
    }

    /// Sum of the displayed category values, rounded to 2 decimal places
    pub fn total(&self) -> f64 {
        round2(self.categories.iter().map(|c| c.cost).sum())
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

/// Index of the daily series: a calendar day, or a sub-day instant for `today`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DailyKey {
    Day(NaiveDate),
    Instant(DateTime<Utc>),
}

impl fmt::Display for DailyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day(date) => write!(f, "{}", date.format(crate::format::DAY_FORMAT)),
            Self::Instant(ts) => write!(f, "{}", ts.format(crate::format::SUB_DAY_FORMAT)),
        }
    }
}

/// Cumulative cost per class at one index point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyCostPoint {
    pub key: DailyKey,
    pub cpu: f64,
    pub gpu: f64,
    pub storage: f64,
}

/// Cumulative cost series, ascending by key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyCostTable {
    pub points: Vec<DailyCostPoint>,
}

impl DailyCostTable {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Point at a given key
    pub fn get(&self, key: &DailyKey) -> Option<&DailyCostPoint> {
        self.points.iter().find(|p| &p.key == key)
    }

    /// Range to plot the series over
    ///
    /// Day-indexed series are padded by one day on each side so the first
    /// and last bars are not clipped; sub-day series use their raw extent.
    pub fn axis_bounds(&self) -> Option<(DailyKey, DailyKey)> {
        let first = self.points.first()?.key;
        let last = self.points.last()?.key;
        Some(match (first, last) {
            (DailyKey::Day(start), DailyKey::Day(end)) => (
                DailyKey::Day(start - Duration::days(1)),
                DailyKey::Day(end + Duration::days(1)),
            ),
            bounds => bounds,
        })
    }
}

/// Summed cost of one breakdown group
///
/// `cost` keeps full precision; round with [`BreakdownEntry::display_cost`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    /// Group key (project id, username or organization)
    pub key: String,
    /// Name shown for the group (project name for projects, the key otherwise)
    pub name: String,
    pub cost: f64,
}

impl BreakdownEntry {
    /// Cost rounded for display
    pub fn display_cost(&self) -> f64 {
        round2(self.cost)
    }
}

/// One bar of a breakdown chart, with the part over the spend limit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownBar {
    /// Group key the bar belongs to
    pub key: String,
    pub name: String,
    /// Name to draw; `name (key)` when another group shares the name
    pub label: String,
    pub cost: f64,
    pub overflow: f64,
}

/// Cost per group for one dimension, in first-seen order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionBreakdown {
    pub dimension: BreakdownDimension,
    pub entries: Vec<BreakdownEntry>,
}

impl DimensionBreakdown {
    pub fn new(dimension: BreakdownDimension) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&BreakdownEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Rounded bars with overflow above `limit`; no limit means no overflow
    pub fn bars(&self, limit: Option<f64>) -> Vec<BreakdownBar> {
        self.entries
            .iter()
            .map(|entry| {
                let cost = entry.display_cost();
                let overflow = limit.map_or(0.0, |max| round2((cost - max).max(0.0)));
                let shared_name = self
                    .entries
                    .iter()
                    .any(|other| other.name == entry.name && other.key != entry.key);
                let label = if shared_name {
                    format!("{} ({})", entry.name, entry.key)
                } else {
                    entry.name.clone()
                };
                BreakdownBar {
                    key: entry.key.clone(),
                    name: entry.name.clone(),
                    label,
                    cost,
                    overflow,
                }
            })
            .collect()
    }
}

/// Project, user and organization breakdowns of one detail fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub projects: DimensionBreakdown,
    pub users: DimensionBreakdown,
    pub organizations: DimensionBreakdown,
}

impl Default for CostBreakdown {
    fn default() -> Self {
        Self {
            projects: DimensionBreakdown::new(BreakdownDimension::Project),
            users: DimensionBreakdown::new(BreakdownDimension::User),
            organizations: DimensionBreakdown::new(BreakdownDimension::Organization),
        }
    }
}

impl CostBreakdown {
    /// Breakdown for one dimension
    pub fn dimension(&self, dimension: BreakdownDimension) -> &DimensionBreakdown {
        match dimension {
            BreakdownDimension::Project => &self.projects,
            BreakdownDimension::User => &self.users,
            BreakdownDimension::Organization => &self.organizations,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.users.is_empty() && self.organizations.is_empty()
    }
}

/// Spend limits used to flag breakdown overflow
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpendLimits {
    pub project: Option<f64>,
    pub organization: Option<f64>,
}

impl Default for SpendLimits {
    fn default() -> Self {
        Self {
            project: Some(8.0),
            organization: Some(500.0),
        }
    }
}

impl SpendLimits {
    /// Limit applying to a dimension; users are never limited
    pub fn for_dimension(&self, dimension: BreakdownDimension) -> Option<f64> {
        match dimension {
            BreakdownDimension::Project => self.project,
            BreakdownDimension::Organization => self.organization,
            BreakdownDimension::User => None,
        }
    }
}

/// One row of the execution table, already formatted for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ExecutionRow {
    #[serde(rename = "TYPE")]
    pub workload_type: String,
    pub user: String,
    pub start: String,
    pub end: String,
    pub cpu_cost: String,
    pub gpu_cost: String,
    pub compute_cost: String,
    pub storage_cost: String,
    pub project_id: String,
}

/// Per-workload execution costs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionTable {
    pub rows: Vec<ExecutionRow>,
}

impl ExecutionTable {
    /// Column headers in display order
    pub const COLUMNS: [&'static str; 9] = [
        "TYPE",
        "USER",
        "START",
        "END",
        "CPU_COST",
        "GPU_COST",
        "COMPUTE_COST",
        "STORAGE_COST",
        "PROJECT_ID",
    ];

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Everything one report pass produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub window: TimeWindow,
    pub filter: Option<FilterSelection>,
    pub limits: SpendLimits,
    pub summary: CostSummary,
    pub daily: DailyCostTable,
    pub breakdown: CostBreakdown,
    pub executions: ExecutionTable,
}
