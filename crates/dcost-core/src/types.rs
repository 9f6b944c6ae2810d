//! Core domain types for dcost
//!
//! This module contains the records returned by the cost endpoints and the
//! small closed enums (windows, breakdown dimensions, cost components) that
//! drive query construction and aggregation.

use crate::labels;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Relative time range a report covers
///
/// Drives both the upstream `window` parameter and the rollup policy of the
/// daily series: only [`TimeWindow::Today`] keeps the sub-day index.
///
/// # Examples
/// ```
/// use dcost_core::types::TimeWindow;
///
/// let window: TimeWindow = "lastweek".parse().unwrap();
/// assert_eq!(window, TimeWindow::LastWeek);
/// assert_eq!(window.label(), "Last week");
/// assert!(window.collapses_to_days());
/// assert!(!TimeWindow::Today.collapses_to_days());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    /// Last 30 days
    #[default]
    #[serde(rename = "30d")]
    Last30Days,
    /// Last 15 days
    #[serde(rename = "15d")]
    Last15Days,
    /// Last 14 days
    #[serde(rename = "14d")]
    Last14Days,
    /// Previous calendar week
    LastWeek,
    /// Today, at the upstream's native sub-day resolution
    Today,
}

impl TimeWindow {
    /// All windows in menu order
    pub const ALL: [TimeWindow; 5] = [
        TimeWindow::Last30Days,
        TimeWindow::Last15Days,
        TimeWindow::Last14Days,
        TimeWindow::LastWeek,
        TimeWindow::Today,
    ];

    /// Token sent as the upstream `window` parameter
    pub fn token(&self) -> &'static str {
        match self {
            Self::Last30Days => "30d",
            Self::Last15Days => "15d",
            Self::Last14Days => "14d",
            Self::LastWeek => "lastweek",
            Self::Today => "today",
        }
    }

    /// Human-facing label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Last30Days => "Last 30 days",
            Self::Last15Days => "Last 15 days",
            Self::Last14Days => "Last 14 days",
            Self::LastWeek => "Last week",
            Self::Today => "Today",
        }
    }

    /// Whether the daily series is collapsed to calendar days
    pub fn collapses_to_days(&self) -> bool {
        !matches!(self, Self::Today)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

impl FromStr for TimeWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|w| w.token() == wanted || w.label().to_lowercase() == wanted)
            .ok_or_else(|| {
                format!("Invalid window: {s} (expected one of 30d, 15d, 14d, lastweek, today)")
            })
    }
}

/// Attribute used to group spend and to drill down
///
/// # Examples
/// ```
/// use dcost_core::types::BreakdownDimension;
///
/// let dim: BreakdownDimension = "org".parse().unwrap();
/// assert_eq!(dim, BreakdownDimension::Organization);
/// assert_eq!(dim.label(), "dominodatalab_com_organization_name");
/// assert_eq!(dim.next_after_drilldown(), BreakdownDimension::Project);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakdownDimension {
    /// Spend per project
    Project,
    /// Spend per starting user
    User,
    /// Spend per organization
    Organization,
}

impl BreakdownDimension {
    /// All dimensions in display order
    pub const ALL: [BreakdownDimension; 3] = [
        BreakdownDimension::Project,
        BreakdownDimension::User,
        BreakdownDimension::Organization,
    ];

    /// Upstream label name used for filtering and aggregation
    pub fn label(&self) -> &'static str {
        match self {
            Self::Project => labels::PROJECT_NAME_LABEL,
            Self::User => labels::USERNAME_LABEL,
            Self::Organization => labels::ORGANIZATION_LABEL,
        }
    }

    /// Chart title for this dimension
    pub fn title(&self) -> &'static str {
        match self {
            Self::Project => "Top Projects",
            Self::User => "User",
            Self::Organization => "Organization",
        }
    }

    /// Breakdown to show next once the user has drilled into this dimension
    pub fn next_after_drilldown(&self) -> BreakdownDimension {
        match self {
            Self::Organization => Self::Project,
            Self::Project => Self::User,
            Self::User => Self::Project,
        }
    }
}

impl fmt::Display for BreakdownDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Project => write!(f, "Project"),
            Self::User => write!(f, "User"),
            Self::Organization => write!(f, "Organization"),
        }
    }
}

impl FromStr for BreakdownDimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "project" | "projects" | "top projects" => Ok(Self::Project),
            "user" | "users" | "username" => Ok(Self::User),
            "organization" | "organisation" | "org" => Ok(Self::Organization),
            _ => Err(format!(
                "Invalid breakdown dimension: {s} (expected project, user or organization)"
            )),
        }
    }
}

/// Time range a record covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostWindow {
    /// Inclusive start, UTC
    pub start: DateTime<Utc>,
    /// Exclusive end, UTC
    pub end: DateTime<Utc>,
}

/// Individual monetary fields carried by an allocation record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CostComponent {
    CpuCost,
    CpuCostAdjustment,
    GpuCost,
    GpuCostAdjustment,
    PvCost,
    PvCostAdjustment,
    RamCost,
    RamCostAdjustment,
    TotalCost,
}

/// Components summed into the CPU class of the daily series
pub const CPU_CLASS: [CostComponent; 2] =
    [CostComponent::CpuCost, CostComponent::CpuCostAdjustment];

/// Components summed into the GPU class of the daily series
pub const GPU_CLASS: [CostComponent; 2] =
    [CostComponent::GpuCost, CostComponent::GpuCostAdjustment];

/// Components summed into the Storage class of the daily series
pub const STORAGE_CLASS: [CostComponent; 4] = [
    CostComponent::PvCost,
    CostComponent::PvCostAdjustment,
    CostComponent::RamCost,
    CostComponent::RamCostAdjustment,
];

/// One billing entry for a workload over a time window
///
/// Cost fields are optional upstream; read them through [`AllocationRecord::cost`]
/// or [`AllocationRecord::sum_costs`], which coalesce missing values to zero.
///
/// # Examples
/// ```
/// use dcost_core::types::{AllocationRecord, CostComponent, CPU_CLASS};
///
/// let record: AllocationRecord = serde_json::from_str(r#"{
///     "name": "train/p1/ProjectOne/alice/org1",
///     "window": {"start": "2023-04-28T15:05:00Z", "end": "2023-04-28T15:10:00Z"},
///     "cpuCost": 1.25,
///     "unknownField": true
/// }"#).unwrap();
///
/// assert_eq!(record.cost(CostComponent::CpuCost), 1.25);
/// assert_eq!(record.cost(CostComponent::GpuCost), 0.0);
/// assert_eq!(record.sum_costs(&CPU_CLASS), 1.25);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRecord {
    /// Composite dimension key, fields joined by `/`
    pub name: String,
    /// Time window covered by this entry
    pub window: CostWindow,
    #[serde(default)]
    pub cpu_cost: Option<f64>,
    #[serde(default)]
    pub cpu_cost_adjustment: Option<f64>,
    #[serde(default)]
    pub gpu_cost: Option<f64>,
    #[serde(default)]
    pub gpu_cost_adjustment: Option<f64>,
    #[serde(default)]
    pub pv_cost: Option<f64>,
    #[serde(default)]
    pub pv_cost_adjustment: Option<f64>,
    #[serde(default)]
    pub ram_cost: Option<f64>,
    #[serde(default)]
    pub ram_cost_adjustment: Option<f64>,
    #[serde(default)]
    pub total_cost: Option<f64>,
}

impl AllocationRecord {
    /// Create a record with every cost component absent
    pub fn new(name: impl Into<String>, window: CostWindow) -> Self {
        Self {
            name: name.into(),
            window,
            cpu_cost: None,
            cpu_cost_adjustment: None,
            gpu_cost: None,
            gpu_cost_adjustment: None,
            pv_cost: None,
            pv_cost_adjustment: None,
            ram_cost: None,
            ram_cost_adjustment: None,
            total_cost: None,
        }
    }

    /// Read one cost component, treating an absent value as zero
    pub fn cost(&self, component: CostComponent) -> f64 {
        let value = match component {
            CostComponent::CpuCost => self.cpu_cost,
            CostComponent::CpuCostAdjustment => self.cpu_cost_adjustment,
            CostComponent::GpuCost => self.gpu_cost,
            CostComponent::GpuCostAdjustment => self.gpu_cost_adjustment,
            CostComponent::PvCost => self.pv_cost,
            CostComponent::PvCostAdjustment => self.pv_cost_adjustment,
            CostComponent::RamCost => self.ram_cost,
            CostComponent::RamCostAdjustment => self.ram_cost_adjustment,
            CostComponent::TotalCost => self.total_cost,
        };
        value.unwrap_or(0.0)
    }

    /// Sum several components, each coalesced to zero
    pub fn sum_costs(&self, components: &[CostComponent]) -> f64 {
        components.iter().map(|c| self.cost(*c)).sum()
    }

    /// Whether this is an idle/unallocated pseudo-entry
    pub fn is_idle(&self) -> bool {
        labels::is_sentinel(&self.name)
    }
}

/// One billing entry for a resource category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    /// Resource category label (e.g. "Node", "Disk")
    #[serde(rename = "type")]
    pub category: String,
    /// Cost for the window; absent counts as zero
    #[serde(default)]
    pub total_cost: Option<f64>,
    /// Window covered, when the endpoint reports it
    #[serde(default)]
    pub window: Option<CostWindow>,
}

impl AssetRecord {
    /// Total cost, treating an absent value as zero
    pub fn cost(&self) -> f64 {
        self.total_cost.unwrap_or(0.0)
    }
}

/// Envelope returned by both cost endpoints
///
/// `data` may contain `null` entries for windows without history; they are
/// dropped by [`CostResponse::into_records`].
#[derive(Debug, Clone, Deserialize)]
pub struct CostResponse<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<Option<T>>,
}

impl<T> CostResponse<T> {
    /// Non-null records in upstream order
    pub fn into_records(self) -> Vec<T> {
        self.data.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_time_window_parsing() {
        assert_eq!("30d".parse::<TimeWindow>().unwrap(), TimeWindow::Last30Days);
        assert_eq!("15d".parse::<TimeWindow>().unwrap(), TimeWindow::Last15Days);
        assert_eq!("14D".parse::<TimeWindow>().unwrap(), TimeWindow::Last14Days);
        assert_eq!(
            "Last week".parse::<TimeWindow>().unwrap(),
            TimeWindow::LastWeek
        );
        assert_eq!("today".parse::<TimeWindow>().unwrap(), TimeWindow::Today);
        assert!("yesterday".parse::<TimeWindow>().is_err());
    }

    #[test]
    fn test_time_window_default_and_display() {
        assert_eq!(TimeWindow::default(), TimeWindow::Last30Days);
        assert_eq!(TimeWindow::LastWeek.to_string(), "lastweek");
    }

    #[test]
    fn test_dimension_labels_are_distinct() {
        let labels: std::collections::HashSet<_> =
            BreakdownDimension::ALL.iter().map(|d| d.label()).collect();
        assert_eq!(labels.len(), 3);
    }

    #[test]
    fn test_drilldown_follow_up() {
        assert_eq!(
            BreakdownDimension::Project.next_after_drilldown(),
            BreakdownDimension::User
        );
        assert_eq!(
            BreakdownDimension::User.next_after_drilldown(),
            BreakdownDimension::Project
        );
    }

    #[test]
    fn test_allocation_missing_costs_are_zero() {
        let window = CostWindow {
            start: Utc.with_ymd_and_hms(2023, 4, 28, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2023, 4, 28, 0, 5, 0).unwrap(),
        };
        let mut record = AllocationRecord::new("a/b/c/d/e", window);
        record.pv_cost = Some(0.5);
        record.ram_cost_adjustment = Some(0.25);

        assert_eq!(record.sum_costs(&STORAGE_CLASS), 0.75);
        assert_eq!(record.sum_costs(&GPU_CLASS), 0.0);
        assert_eq!(record.cost(CostComponent::TotalCost), 0.0);
    }

    #[test]
    fn test_allocation_null_costs_deserialize() {
        let record: AllocationRecord = serde_json::from_str(
            r#"{"name":"__idle__","window":{"start":"2023-04-28T00:00:00Z","end":"2023-04-29T00:00:00Z"},"cpuCost":null,"totalCost":3.5}"#,
        )
        .unwrap();
        assert!(record.is_idle());
        assert_eq!(record.cost(CostComponent::CpuCost), 0.0);
        assert_eq!(record.cost(CostComponent::TotalCost), 3.5);
    }

    #[test]
    fn test_asset_record_deserialize() {
        let asset: AssetRecord =
            serde_json::from_str(r#"{"type":"Node","totalCost":12.345,"extra":1}"#).unwrap();
        assert_eq!(asset.category, "Node");
        assert_eq!(asset.cost(), 12.345);
        assert!(asset.window.is_none());
    }

    #[test]
    fn test_response_skips_null_entries() {
        let response: CostResponse<AssetRecord> = serde_json::from_str(
            r#"{"code":200,"data":[{"type":"Disk","totalCost":1.0},null,{"type":"Node"}]}"#,
        )
        .unwrap();
        let records = response.into_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].cost(), 0.0);
    }

    #[test]
    fn test_response_without_data_is_empty() {
        let response: CostResponse<AllocationRecord> = serde_json::from_str("{}").unwrap();
        assert!(response.into_records().is_empty());
    }
}
