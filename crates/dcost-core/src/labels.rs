//! Upstream label names and composite-key decoding
//!
//! Allocation queries aggregated by several labels return a `name` that joins
//! the label values with `/`, in the order the labels were requested. The
//! decoder here takes that same label list, so the query and the decoder are
//! built from one constant and a mismatch fails loudly instead of shifting
//! fields.

use crate::error::{DcostError, Result};
use serde::{Deserialize, Serialize};

/// Workload type label (e.g. "Workspace", "Batch")
pub const WORKLOAD_TYPE_LABEL: &str = "dominodatalab_com_workload_type";
/// Project identifier label
pub const PROJECT_ID_LABEL: &str = "dominodatalab_com_project_id";
/// Project display name label
pub const PROJECT_NAME_LABEL: &str = "dominodatalab_com_project_name";
/// Starting user label
pub const USERNAME_LABEL: &str = "dominodatalab_com_starting_user_username";
/// Organization label
pub const ORGANIZATION_LABEL: &str = "dominodatalab_com_organization_name";

/// Label order of the full-detail allocation query
pub const DETAIL_LABELS: [&str; 5] = [
    WORKLOAD_TYPE_LABEL,
    PROJECT_ID_LABEL,
    PROJECT_NAME_LABEL,
    USERNAME_LABEL,
    ORGANIZATION_LABEL,
];

/// Separator between label values in a composite name
pub const NAME_DELIMITER: char = '/';

/// Prefix marking idle and unallocated pseudo-entries
pub const IDLE_SENTINEL_PREFIX: &str = "__";

/// Whether a name or label value is an idle/unallocated sentinel
pub fn is_sentinel(value: &str) -> bool {
    value.starts_with(IDLE_SENTINEL_PREFIX)
}

/// Render the `aggregate` parameter for a label list
///
/// ```
/// use dcost_core::labels::aggregate_param;
///
/// assert_eq!(aggregate_param(&["a", "b"]), "label:a,label:b");
/// ```
pub fn aggregate_param(labels: &[&str]) -> String {
    labels
        .iter()
        .map(|label| format!("label:{label}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Split a composite name into exactly `N` positional values
///
/// `labels` must be the list the query was aggregated by; its length fixes
/// the expected field count.
///
/// # Errors
///
/// Returns [`DcostError::MalformedRecord`] when the field count differs.
pub fn decode_composite<'a, const N: usize>(
    name: &'a str,
    labels: &[&str; N],
) -> Result<[&'a str; N]> {
    let parts: Vec<&str> = name.split(NAME_DELIMITER).collect();
    let found = parts.len();
    parts.try_into().map_err(|_| DcostError::MalformedRecord {
        name: name.to_string(),
        expected: N,
        found,
        labels: labels.join(","),
    })
}

/// Decoded name of a full-detail allocation record
///
/// # Examples
/// ```
/// use dcost_core::labels::DetailKey;
///
/// let key = DetailKey::decode("train/p1/ProjectOne/alice/org1").unwrap();
/// assert_eq!(key.workload_type, "train");
/// assert_eq!(key.project_id, "p1");
/// assert_eq!(key.organization, "org1");
///
/// assert!(DetailKey::decode("train/p1/alice").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailKey {
    pub workload_type: String,
    pub project_id: String,
    pub project_name: String,
    pub username: String,
    pub organization: String,
}

impl DetailKey {
    /// Decode a name produced by an aggregation over [`DETAIL_LABELS`]
    pub fn decode(name: &str) -> Result<Self> {
        let [workload_type, project_id, project_name, username, organization] =
            decode_composite(name, &DETAIL_LABELS)?;
        Ok(Self {
            workload_type: workload_type.to_string(),
            project_id: project_id.to_string(),
            project_name: project_name.to_string(),
            username: username.to_string(),
            organization: organization.to_string(),
        })
    }
}
