//! Common test utilities and helpers for dcost tests
//!
//! Record builders, an in-memory record source, a wiremock-backed fake cost
//! service and an environment variable guard.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use dcost_core::error::Result;
use dcost_core::query::CostQuery;
use dcost_core::source::RecordSource;
use dcost_core::types::{AllocationRecord, AssetRecord, CostWindow};
use once_cell::sync::Lazy;
use serde_json::{Value, json};
use std::env;
use std::sync::Mutex;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Global mutex to serialize environment variable modifications in tests
pub static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// Common test projects as (id, name)
pub const TEST_PROJECTS: &[(&str, &str)] = &[
    ("p1", "ProjectOne"),
    ("p2", "ProjectTwo"),
    ("p3", "ProjectThree"),
];

/// Common test users
pub const TEST_USERS: &[&str] = &["alice", "bob", "carol"];

/// Common test organizations
pub const TEST_ORGS: &[&str] = &["org1", "org2"];

/// Builder for AllocationRecord test values
pub struct AllocationRecordBuilder {
    record: AllocationRecord,
}

impl AllocationRecordBuilder {
    /// Record named `name` covering 2023-04-28 00:00 to 00:05 UTC
    pub fn new(name: &str) -> Self {
        let start = Utc.with_ymd_and_hms(2023, 4, 28, 0, 0, 0).unwrap();
        Self {
            record: AllocationRecord::new(
                name,
                CostWindow {
                    start,
                    end: start + Duration::minutes(5),
                },
            ),
        }
    }

    /// Full-detail record from its five fields
    pub fn detail(
        workload_type: &str,
        project_id: &str,
        project_name: &str,
        username: &str,
        organization: &str,
    ) -> Self {
        Self::new(&format!(
            "{workload_type}/{project_id}/{project_name}/{username}/{organization}"
        ))
    }

    pub fn starting_at(mut self, start: DateTime<Utc>) -> Self {
        self.record.window = CostWindow {
            start,
            end: start + Duration::minutes(5),
        };
        self
    }

    pub fn at(self, year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Self {
        self.starting_at(Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).unwrap())
    }

    pub fn cpu(mut self, cost: f64) -> Self {
        self.record.cpu_cost = Some(cost);
        self
    }

    pub fn cpu_adjustment(mut self, cost: f64) -> Self {
        self.record.cpu_cost_adjustment = Some(cost);
        self
    }

    pub fn gpu(mut self, cost: f64) -> Self {
        self.record.gpu_cost = Some(cost);
        self
    }

    pub fn gpu_adjustment(mut self, cost: f64) -> Self {
        self.record.gpu_cost_adjustment = Some(cost);
        self
    }

    pub fn pv(mut self, cost: f64) -> Self {
        self.record.pv_cost = Some(cost);
        self
    }

    pub fn ram(mut self, cost: f64) -> Self {
        self.record.ram_cost = Some(cost);
        self
    }

    pub fn total(mut self, cost: f64) -> Self {
        self.record.total_cost = Some(cost);
        self
    }

    pub fn build(self) -> AllocationRecord {
        self.record
    }

    /// Build as the JSON object the cost service returns
    pub fn to_json(self) -> Value {
        serde_json::to_value(self.record).unwrap()
    }
}

/// Asset record with a category and total
pub fn asset(category: &str, total: f64) -> AssetRecord {
    AssetRecord {
        category: category.to_string(),
        total_cost: Some(total),
        window: None,
    }
}

/// In-memory record source answering by query shape
#[derive(Default)]
pub struct StaticSource {
    pub assets: Vec<AssetRecord>,
    pub daily: Vec<AllocationRecord>,
    pub detail: Vec<AllocationRecord>,
    pub queries: Mutex<Vec<CostQuery>>,
}

#[async_trait]
impl RecordSource for StaticSource {
    async fn fetch_assets(&self, query: &CostQuery) -> Result<Vec<AssetRecord>> {
        self.queries.lock().unwrap().push(query.clone());
        Ok(self.assets.clone())
    }

    async fn fetch_allocations(&self, query: &CostQuery) -> Result<Vec<AllocationRecord>> {
        self.queries.lock().unwrap().push(query.clone());
        if query.accumulate {
            Ok(self.detail.clone())
        } else {
            Ok(self.daily.clone())
        }
    }
}

/// Wrap records in the cost service envelope
pub fn envelope(records: Vec<Value>) -> Value {
    json!({ "code": 200, "data": records })
}

/// Mount asset, daily and detail responses on a fake cost service
///
/// Daily and detail are told apart by the `accumulate` parameter.
pub async fn mount_cost_service(
    server: &MockServer,
    assets: Vec<Value>,
    daily: Vec<Value>,
    detail: Vec<Value>,
) {
    Mock::given(method("GET"))
        .and(path("/asset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(assets)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/allocation"))
        .and(query_param("accumulate", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(daily)))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/allocation"))
        .and(query_param("accumulate", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(detail)))
        .mount(server)
        .await;
}

/// RAII guard for environment variable manipulation in tests
///
/// Restores every variable it touched when dropped, even on panic.
pub struct EnvVarGuard {
    vars: Vec<(String, Option<String>)>,
}

impl EnvVarGuard {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    /// Set an environment variable and save its original value for restoration
    pub fn set(&mut self, key: &str, value: &str) {
        let original = env::var(key).ok();
        self.vars.push((key.to_string(), original));
        // env::set_var is unsafe since edition 2024
        unsafe {
            env::set_var(key, value);
        }
    }

    /// Remove an environment variable and save its original value for restoration
    pub fn remove(&mut self, key: &str) {
        let original = env::var(key).ok();
        self.vars.push((key.to_string(), original));
        unsafe {
            env::remove_var(key);
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.vars.iter().rev() {
            unsafe {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

impl Default for EnvVarGuard {
    fn default() -> Self {
        Self::new()
    }
}
