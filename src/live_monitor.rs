//! Periodic re-run of the cost report
//!
//! Every tick runs a complete fetch/aggregate/render pass. A failed pass is
//! reported in place of the report and the loop keeps going; nothing is
//! cached between passes.

use crate::orchestrator::{DashboardSession, FetchOrchestrator};
use chrono::Local;
use colored::*;
use dcost_core::error::Result;
use dcost_core::views::SpendLimits;
use dcost_terminal::get_formatter;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tracing::warn;

/// Live monitoring state
pub struct LiveMonitor {
    orchestrator: Arc<FetchOrchestrator>,
    session: DashboardSession,
    limits: SpendLimits,
    json_output: bool,
    interval_secs: u64,
}

impl LiveMonitor {
    pub fn new(
        orchestrator: Arc<FetchOrchestrator>,
        session: DashboardSession,
        limits: SpendLimits,
        json_output: bool,
        interval_secs: u64,
    ) -> Self {
        Self {
            orchestrator,
            session,
            limits,
            json_output,
            interval_secs: interval_secs.max(1),
        }
    }

    /// Start the monitoring loop; returns on Ctrl-C
    pub async fn run(self) -> Result<()> {
        let mut interval = interval(Duration::from_secs(self.interval_secs));
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let output = self.render_pass().await;
                    if !self.json_output {
                        print!("\x1B[2J\x1B[1;1H"); // Clear screen and move cursor to top-left
                        println!(
                            "Live Monitoring - Last updated: {}",
                            Local::now().format("%Y-%m-%d %H:%M:%S")
                        );
                        println!(
                            "Refresh interval: {}s | Press Ctrl+C to exit",
                            self.interval_secs
                        );
                        println!("{}", "-".repeat(80));
                    }
                    println!("{output}");
                }
                _ = tokio::signal::ctrl_c() => {
                    println!("\nExiting live monitoring mode...");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Run one pass and render it, or render its error
    pub async fn render_pass(&self) -> String {
        match self
            .orchestrator
            .build_dashboard(&self.session, self.limits)
            .await
        {
            Ok(dashboard) => get_formatter(self.json_output).format_dashboard(&dashboard),
            Err(e) => {
                warn!("Report pass failed: {e}");
                let message = e.user_message();
                if self.json_output {
                    serde_json::json!({ "error": message }).to_string()
                } else {
                    message.red().to_string()
                }
            }
        }
    }
}
