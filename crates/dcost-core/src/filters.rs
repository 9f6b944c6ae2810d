//! Drill-down filter state
//!
//! A single optional (dimension, value) selection constrains every query of
//! the next report pass. Selecting a new value replaces the previous one;
//! clearing removes the constraint.
//!
//! # Examples
//!
//! ```
//! use dcost_core::filters::FilterState;
//! use dcost_core::types::BreakdownDimension;
//!
//! let mut state = FilterState::new();
//! assert_eq!(state.to_query_fragment(), None);
//!
//! state.set(BreakdownDimension::User, "alice");
//! assert_eq!(
//!     state.to_query_fragment().as_deref(),
//!     Some(r#"label[dominodatalab_com_starting_user_username]:"alice""#)
//! );
//!
//! state.clear();
//! assert!(!state.is_active());
//! ```

use crate::types::BreakdownDimension;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One drill-down click: a dimension and the value that was picked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub dimension: BreakdownDimension,
    pub value: String,
}

impl FilterSelection {
    /// Create a new selection
    pub fn new(dimension: BreakdownDimension, value: impl Into<String>) -> Self {
        Self {
            dimension,
            value: value.into(),
        }
    }

    /// Render as an upstream `filter` expression
    pub fn to_query_fragment(&self) -> String {
        format!("label[{}]:\"{}\"", self.dimension.label(), self.value)
    }
}

impl fmt::Display for FilterSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.dimension, self.value)
    }
}

/// Parses `<dimension>=<value>`, e.g. `project=ProjectOne`
impl FromStr for FilterSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (dimension, value) = s
            .split_once('=')
            .ok_or_else(|| format!("Invalid filter '{s}', expected <dimension>=<value>"))?;
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("Invalid filter '{s}': value must not be empty"));
        }
        Ok(Self::new(dimension.parse()?, value))
    }
}

/// Session-scoped drill-down state
///
/// Holds at most one [`FilterSelection`]. Report passes read it once, when
/// building query parameters, so a change only affects the next pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    selection: Option<FilterSelection>,
}

impl FilterState {
    /// Create an unconstrained state
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an optional selection
    pub fn with_selection(selection: Option<FilterSelection>) -> Self {
        Self { selection }
    }

    /// Replace the active selection (last click wins)
    pub fn set(&mut self, dimension: BreakdownDimension, value: impl Into<String>) {
        self.selection = Some(FilterSelection::new(dimension, value));
    }

    /// Remove the active selection
    pub fn clear(&mut self) {
        self.selection = None;
    }

    /// The active selection, if any
    pub fn selection(&self) -> Option<&FilterSelection> {
        self.selection.as_ref()
    }

    /// Whether a selection is active
    pub fn is_active(&self) -> bool {
        self.selection.is_some()
    }

    /// Filter expression for the upstream query, `None` when unconstrained
    pub fn to_query_fragment(&self) -> Option<String> {
        self.selection.as_ref().map(FilterSelection::to_query_fragment)
    }
}
