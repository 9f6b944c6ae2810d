//! HTTP record source and token providers for dcost
//!
//! This crate implements the `RecordSource` trait against the cost
//! service's asset and allocation endpoints using reqwest.

pub mod auth;
pub mod client;

pub use auth::{HttpTokenProvider, StaticTokenProvider};
pub use client::CostClient;
