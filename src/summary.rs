//! Top-level cost summary by resource category

use dcost_core::format::round2;
use dcost_core::types::AssetRecord;
use dcost_core::views::{CategoryCost, CostSummary};
use std::collections::HashMap;
use tracing::debug;

/// Sum asset records per category, keeping first-seen category order
///
/// No records are excluded; assets carry no idle sentinel. Each category
/// total is rounded to 2 decimal places.
///
/// # Examples
///
/// ```
/// use dcost::summary::summarize;
/// use dcost_core::types::AssetRecord;
///
/// let assets: Vec<AssetRecord> = serde_json::from_str(r#"[
///     {"type": "Node", "totalCost": 1.5},
///     {"type": "Disk", "totalCost": 0.25},
///     {"type": "Node", "totalCost": 2.0}
/// ]"#).unwrap();
///
/// let summary = summarize(&assets);
/// assert_eq!(summary.categories[0].category, "Node");
/// assert_eq!(summary.get("Node"), Some(3.5));
/// assert_eq!(summary.total(), 3.75);
/// ```
pub fn summarize(assets: &[AssetRecord]) -> CostSummary {
    let mut order: Vec<(&str, f64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for asset in assets {
        let slot = *index.entry(asset.category.as_str()).or_insert_with(|| {
            order.push((asset.category.as_str(), 0.0));
            order.len() - 1
        });
        order[slot].1 += asset.cost();
    }

    debug!(
        "Summarized {} asset records into {} categories",
        assets.len(),
        order.len()
    );

    CostSummary {
        categories: order
            .into_iter()
            .map(|(category, cost)| CategoryCost {
                category: category.to_string(),
                cost: round2(cost),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(category: &str, cost: Option<f64>) -> AssetRecord {
        AssetRecord {
            category: category.to_string(),
            total_cost: cost,
            window: None,
        }
    }

    #[test]
    fn test_empty_input() {
        let summary = summarize(&[]);
        assert!(summary.is_empty());
        assert_eq!(summary.total(), 0.0);
    }

    #[test]
    fn test_first_seen_order() {
        let summary = summarize(&[
            asset("GPU", Some(1.0)),
            asset("Node", Some(2.0)),
            asset("GPU", Some(3.0)),
            asset("Disk", None),
        ]);
        let names: Vec<&str> = summary
            .categories
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(names, vec!["GPU", "Node", "Disk"]);
        assert_eq!(summary.get("GPU"), Some(4.0));
        assert_eq!(summary.get("Disk"), Some(0.0));
    }

    #[test]
    fn test_rounds_per_category() {
        let summary = summarize(&[asset("Node", Some(1.004)), asset("Node", Some(2.001))]);
        assert_eq!(summary.get("Node"), Some(3.0));
    }

    #[test]
    fn test_total_matches_displayed_values() {
        let summary = summarize(&[
            asset("Node", Some(1.111)),
            asset("Disk", Some(2.222)),
            asset("Network", Some(3.333)),
        ]);
        let displayed: f64 = summary.categories.iter().map(|c| c.cost).sum();
        assert_eq!(summary.total(), round2(displayed));
        assert_eq!(summary.total(), 6.66);
    }
}
