//! Cumulative daily cost series
//!
//! Upstream delivers cost in non-cumulative time slices (often 5-minute
//! buckets). This module re-derives a running total per cost class:
//!
//! 1. bucket every record's CPU, GPU and storage cost by `window.start`
//! 2. walk the buckets in ascending order, summing each class cumulatively
//! 3. for windows other than `today`, collapse to calendar days keeping the
//!    **maximum** cumulative value seen that day
//! 4. round every value to 2 decimal places
//!
//! Collapsing happens strictly after the cumulative sum, and rounding
//! strictly last. Idle entries are included; they are real spend.

use chrono::{DateTime, NaiveDate, Utc};
use dcost_core::format::round2;
use dcost_core::types::{AllocationRecord, CPU_CLASS, GPU_CLASS, STORAGE_CLASS, TimeWindow};
use dcost_core::views::{DailyCostPoint, DailyCostTable, DailyKey};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
struct ClassCosts {
    cpu: f64,
    gpu: f64,
    storage: f64,
}

impl ClassCosts {
    fn of(record: &AllocationRecord) -> Self {
        Self {
            cpu: record.sum_costs(&CPU_CLASS),
            gpu: record.sum_costs(&GPU_CLASS),
            storage: record.sum_costs(&STORAGE_CLASS),
        }
    }

    fn add(&mut self, other: Self) {
        self.cpu += other.cpu;
        self.gpu += other.gpu;
        self.storage += other.storage;
    }

    fn max(&mut self, other: Self) {
        self.cpu = self.cpu.max(other.cpu);
        self.gpu = self.gpu.max(other.gpu);
        self.storage = self.storage.max(other.storage);
    }

    fn point(self, key: DailyKey) -> DailyCostPoint {
        DailyCostPoint {
            key,
            cpu: self.cpu,
            gpu: self.gpu,
            storage: self.storage,
        }
    }
}

/// Running totals per sub-day bucket, ascending, at full precision
///
/// Keys are always [`DailyKey::Instant`].
pub fn cumulative_buckets(records: &[AllocationRecord]) -> Vec<DailyCostPoint> {
    let mut buckets: BTreeMap<DateTime<Utc>, ClassCosts> = BTreeMap::new();
    for record in records {
        buckets
            .entry(record.window.start)
            .or_default()
            .add(ClassCosts::of(record));
    }

    let mut running = ClassCosts::default();
    buckets
        .into_iter()
        .map(|(start, costs)| {
            running.add(costs);
            running.point(DailyKey::Instant(start))
        })
        .collect()
}

/// Build the cumulative series for a window
///
/// # Examples
///
/// ```
/// use dcost::daily_rollup::rollup;
/// use dcost_core::types::{AllocationRecord, CostWindow, TimeWindow};
/// use dcost_core::views::DailyKey;
/// use chrono::{NaiveDate, TimeZone, Utc};
///
/// let slice = |minute: u32, cpu: f64| {
///     let start = Utc.with_ymd_and_hms(2023, 4, 28, 0, minute, 0).unwrap();
///     let end = Utc.with_ymd_and_hms(2023, 4, 28, 0, minute + 5, 0).unwrap();
///     let mut record = AllocationRecord::new("org1", CostWindow { start, end });
///     record.cpu_cost = Some(cpu);
///     record
/// };
///
/// let table = rollup(&[slice(0, 1.0), slice(5, 0.5)], TimeWindow::Last14Days);
/// let day = DailyKey::Day(NaiveDate::from_ymd_opt(2023, 4, 28).unwrap());
/// assert_eq!(table.get(&day).unwrap().cpu, 1.5);
/// ```
pub fn rollup(records: &[AllocationRecord], window: TimeWindow) -> DailyCostTable {
    let cumulative = cumulative_buckets(records);
    let bucket_count = cumulative.len();

    let points: Vec<DailyCostPoint> = if window.collapses_to_days() {
        collapse_to_days(cumulative)
    } else {
        cumulative
    };

    debug!(
        "Rolled {} records into {} buckets, {} points for {}",
        records.len(),
        bucket_count,
        points.len(),
        window
    );

    DailyCostTable {
        points: points
            .into_iter()
            .map(|p| DailyCostPoint {
                key: p.key,
                cpu: round2(p.cpu),
                gpu: round2(p.gpu),
                storage: round2(p.storage),
            })
            .collect(),
    }
}

/// Keep the largest cumulative value of each calendar day (UTC)
fn collapse_to_days(cumulative: Vec<DailyCostPoint>) -> Vec<DailyCostPoint> {
    let mut days: BTreeMap<NaiveDate, ClassCosts> = BTreeMap::new();
    for point in cumulative {
        let day = match point.key {
            DailyKey::Instant(ts) => ts.date_naive(),
            DailyKey::Day(day) => day,
        };
        let costs = ClassCosts {
            cpu: point.cpu,
            gpu: point.gpu,
            storage: point.storage,
        };
        days.entry(day)
            .and_modify(|best| best.max(costs))
            .or_insert(costs);
    }

    days.into_iter()
        .map(|(day, costs)| costs.point(DailyKey::Day(day)))
        .collect()
}
