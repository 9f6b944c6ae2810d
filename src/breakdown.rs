//! Cost breakdowns by project, user and organization
//!
//! Records come from the full-detail query, so every name decodes into the
//! five [`DETAIL_LABELS`](dcost_core::labels::DETAIL_LABELS) fields. Each
//! dimension excludes sentinel values on its own: a record with an idle
//! project name still counts for its user and organization.
//!
//! Sums keep full precision; rounding happens when bars are produced.

use dcost_core::error::Result;
use dcost_core::labels::{DetailKey, is_sentinel};
use dcost_core::types::{AllocationRecord, BreakdownDimension, CostComponent};
use dcost_core::views::{BreakdownEntry, CostBreakdown, DimensionBreakdown};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Insertion-ordered accumulator for one dimension
struct GroupSums {
    breakdown: DimensionBreakdown,
    index: HashMap<String, usize>,
}

impl GroupSums {
    fn new(dimension: BreakdownDimension) -> Self {
        Self {
            breakdown: DimensionBreakdown::new(dimension),
            index: HashMap::new(),
        }
    }

    fn add(&mut self, key: &str, name: &str, cost: f64) {
        if let Some(&slot) = self.index.get(key) {
            self.breakdown.entries[slot].cost += cost;
            return;
        }
        self.index
            .insert(key.to_string(), self.breakdown.entries.len());
        self.breakdown.entries.push(BreakdownEntry {
            key: key.to_string(),
            name: name.to_string(),
            cost,
        });
    }
}

/// Groups full-detail allocation records per dimension
pub struct BreakdownAggregator {
    projects: GroupSums,
    users: GroupSums,
    organizations: GroupSums,
    skipped_idle: usize,
}

impl Default for BreakdownAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl BreakdownAggregator {
    pub fn new() -> Self {
        Self {
            projects: GroupSums::new(BreakdownDimension::Project),
            users: GroupSums::new(BreakdownDimension::User),
            organizations: GroupSums::new(BreakdownDimension::Organization),
            skipped_idle: 0,
        }
    }

    /// Add one record
    ///
    /// # Errors
    ///
    /// Returns `MalformedRecord` when the name does not decode into the
    /// five detail fields.
    pub fn add(&mut self, record: &AllocationRecord) -> Result<()> {
        if record.is_idle() {
            self.skipped_idle += 1;
            return Ok(());
        }

        let key = DetailKey::decode(&record.name).inspect_err(|e| {
            warn!("Failed to decode allocation name: {e}");
        })?;
        let cost = record.cost(CostComponent::TotalCost);

        if !is_sentinel(&key.project_name) {
            self.projects.add(&key.project_id, &key.project_name, cost);
        }
        if !is_sentinel(&key.username) {
            self.users.add(&key.username, &key.username, cost);
        }
        if !is_sentinel(&key.organization) {
            self.organizations
                .add(&key.organization, &key.organization, cost);
        }
        Ok(())
    }

    /// Finish and return the three breakdowns
    pub fn finish(self) -> CostBreakdown {
        debug!(
            "Breakdown: {} projects, {} users, {} organizations ({} idle records skipped)",
            self.projects.breakdown.len(),
            self.users.breakdown.len(),
            self.organizations.breakdown.len(),
            self.skipped_idle
        );
        CostBreakdown {
            projects: self.projects.breakdown,
            users: self.users.breakdown,
            organizations: self.organizations.breakdown,
        }
    }
}

/// Aggregate a whole fetch
///
/// A single malformed name fails the pass; records are never dropped
/// silently.
///
/// # Examples
///
/// ```
/// use dcost::breakdown::aggregate_breakdown;
/// use dcost_core::types::{AllocationRecord, CostWindow};
/// use chrono::{TimeZone, Utc};
///
/// let window = CostWindow {
///     start: Utc.with_ymd_and_hms(2023, 4, 28, 0, 0, 0).unwrap(),
///     end: Utc.with_ymd_and_hms(2023, 4, 29, 0, 0, 0).unwrap(),
/// };
/// let mut record = AllocationRecord::new("train/p1/__unknown__/alice/org1", window);
/// record.total_cost = Some(2.5);
///
/// let breakdown = aggregate_breakdown(&[record]).unwrap();
/// assert!(breakdown.projects.is_empty());
/// assert_eq!(breakdown.users.get("alice").unwrap().cost, 2.5);
/// ```
pub fn aggregate_breakdown(records: &[AllocationRecord]) -> Result<CostBreakdown> {
    let mut aggregator = BreakdownAggregator::new();
    for record in records {
        aggregator.add(record)?;
    }
    Ok(aggregator.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use dcost_core::error::DcostError;
    use dcost_core::types::CostWindow;

    fn record(name: &str, total: f64) -> AllocationRecord {
        let mut record = AllocationRecord::new(
            name,
            CostWindow {
                start: Utc.with_ymd_and_hms(2023, 4, 28, 0, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2023, 4, 29, 0, 0, 0).unwrap(),
            },
        );
        record.total_cost = Some(total);
        record
    }

    #[test]
    fn test_empty_input_gives_three_empty_mappings() {
        let breakdown = aggregate_breakdown(&[]).unwrap();
        assert!(breakdown.projects.is_empty());
        assert!(breakdown.users.is_empty());
        assert!(breakdown.organizations.is_empty());
    }

    #[test]
    fn test_sums_per_dimension() {
        let breakdown = aggregate_breakdown(&[
            record("train/p1/ProjectOne/alice/org1", 1.0),
            record("app/p2/ProjectTwo/alice/org1", 2.0),
            record("train/p1/ProjectOne/bob/org2", 4.0),
        ])
        .unwrap();

        let p1 = breakdown.projects.get("p1").unwrap();
        assert_eq!(p1.name, "ProjectOne");
        assert_eq!(p1.cost, 5.0);
        assert_eq!(breakdown.projects.get("p2").unwrap().cost, 2.0);

        assert_eq!(breakdown.users.get("alice").unwrap().cost, 3.0);
        assert_eq!(breakdown.users.get("bob").unwrap().cost, 4.0);

        assert_eq!(breakdown.organizations.get("org1").unwrap().cost, 3.0);
        assert_eq!(breakdown.organizations.get("org2").unwrap().cost, 4.0);
    }

    #[test]
    fn test_first_seen_order() {
        let breakdown = aggregate_breakdown(&[
            record("t/p9/Nine/zed/orgZ", 1.0),
            record("t/p1/One/amy/orgA", 1.0),
        ])
        .unwrap();
        let keys: Vec<&str> = breakdown
            .projects
            .entries
            .iter()
            .map(|e| e.key.as_str())
            .collect();
        assert_eq!(keys, vec!["p9", "p1"]);
    }

    #[test]
    fn test_sentinel_exclusion_is_per_dimension() {
        let breakdown = aggregate_breakdown(&[
            record("train/p1/__idle__/alice/org1", 1.0),
            record("train/p2/ProjectTwo/__unallocated__/org1", 2.0),
            record("train/p3/ProjectThree/carol/__none__", 4.0),
        ])
        .unwrap();

        assert!(breakdown.projects.get("p1").is_none());
        assert_eq!(breakdown.users.get("alice").unwrap().cost, 1.0);
        assert_eq!(breakdown.organizations.get("org1").unwrap().cost, 3.0);

        assert!(breakdown.users.get("__unallocated__").is_none());
        assert_eq!(breakdown.projects.get("p2").unwrap().cost, 2.0);

        assert!(breakdown.organizations.get("__none__").is_none());
        assert_eq!(breakdown.users.get("carol").unwrap().cost, 4.0);
    }

    #[test]
    fn test_idle_record_is_absent_everywhere() {
        let breakdown = aggregate_breakdown(&[record("__idle__", 10.0)]).unwrap();
        assert!(breakdown.is_empty());
    }

    #[test]
    fn test_malformed_name_fails_the_pass() {
        let err = aggregate_breakdown(&[
            record("train/p1/ProjectOne/alice/org1", 1.0),
            record("train/p1/alice", 1.0),
        ])
        .unwrap_err();
        match err {
            DcostError::MalformedRecord {
                expected, found, ..
            } => {
                assert_eq!(expected, 5);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_no_rounding_during_accumulation() {
        let records: Vec<AllocationRecord> = (0..100)
            .map(|_| record("t/p1/One/alice/org1", 0.004))
            .collect();
        let breakdown = aggregate_breakdown(&records).unwrap();
        let entry = breakdown.projects.get("p1").unwrap();
        assert!((entry.cost - 0.4).abs() < 1e-9);
        assert_eq!(entry.display_cost(), 0.4);
    }
}
