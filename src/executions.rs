//! Per-workload execution table
//!
//! One row per non-idle full-detail record. Column semantics follow the
//! cost service's naming, including its quirk: `GPU_COST` is the sum of
//! the CPU and GPU *adjustments*, while `CPU_COST` is raw CPU plus raw GPU.

use chrono_tz::Tz;
use dcost_core::error::Result;
use dcost_core::format::{format_currency, format_execution_time, round2};
use dcost_core::labels::DetailKey;
use dcost_core::types::{AllocationRecord, CostComponent};
use dcost_core::views::{ExecutionRow, ExecutionTable};
use tracing::debug;

const CPU_COLUMN: [CostComponent; 2] = [CostComponent::CpuCost, CostComponent::GpuCost];

const GPU_COLUMN: [CostComponent; 2] = [
    CostComponent::CpuCostAdjustment,
    CostComponent::GpuCostAdjustment,
];

const STORAGE_COLUMN: [CostComponent; 4] = [
    CostComponent::PvCost,
    CostComponent::RamCost,
    CostComponent::PvCostAdjustment,
    CostComponent::RamCostAdjustment,
];

/// Rounded cost columns of one execution row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionCosts {
    pub cpu: f64,
    pub gpu: f64,
    /// Always `cpu + gpu` of the rounded columns
    pub compute: f64,
    pub storage: f64,
}

impl ExecutionCosts {
    pub fn from_record(record: &AllocationRecord) -> Self {
        let cpu = round2(record.sum_costs(&CPU_COLUMN));
        let gpu = round2(record.sum_costs(&GPU_COLUMN));
        Self {
            cpu,
            gpu,
            compute: round2(cpu + gpu),
            storage: round2(record.sum_costs(&STORAGE_COLUMN)),
        }
    }
}

/// Build the execution table, times rendered in `tz`
///
/// # Errors
///
/// Returns `MalformedRecord` when a non-idle name does not decode into the
/// five detail fields.
///
/// # Examples
///
/// ```
/// use dcost::executions::build_execution_table;
/// use dcost_core::types::{AllocationRecord, CostWindow};
/// use chrono::{TimeZone, Utc};
///
/// let window = CostWindow {
///     start: Utc.with_ymd_and_hms(2023, 4, 28, 15, 5, 0).unwrap(),
///     end: Utc.with_ymd_and_hms(2023, 4, 28, 15, 10, 0).unwrap(),
/// };
/// let mut record = AllocationRecord::new("train/p1/ProjectOne/alice/org1", window);
/// record.cpu_cost = Some(1.004);
/// record.gpu_cost = Some(2.001);
///
/// let table = build_execution_table(&[record], &chrono_tz::UTC).unwrap();
/// let row = &table.rows[0];
/// assert_eq!(row.workload_type, "train");
/// assert_eq!(row.cpu_cost, "$3.0");
/// assert_eq!(row.start, "04/28 03:05 PM");
/// assert_eq!(row.project_id, "p1");
/// ```
pub fn build_execution_table(records: &[AllocationRecord], tz: &Tz) -> Result<ExecutionTable> {
    let mut rows = Vec::with_capacity(records.len());

    for record in records.iter().filter(|r| !r.is_idle()) {
        let key = DetailKey::decode(&record.name)?;
        let costs = ExecutionCosts::from_record(record);

        rows.push(ExecutionRow {
            workload_type: key.workload_type,
            user: key.username,
            start: format_execution_time(&record.window.start, tz),
            end: format_execution_time(&record.window.end, tz),
            cpu_cost: format_currency(costs.cpu),
            gpu_cost: format_currency(costs.gpu),
            compute_cost: format_currency(costs.compute),
            storage_cost: format_currency(costs.storage),
            project_id: key.project_id,
        });
    }

    debug!(
        "Built {} execution rows from {} records",
        rows.len(),
        records.len()
    );
    Ok(ExecutionTable { rows })
}
