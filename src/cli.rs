//! CLI interface for dcost
//!
//! Report options are global so they work with or without a subcommand;
//! running `dcost` alone is the same as `dcost report`.
//!
//! # Example
//!
//! ```bash
//! # Last week's spend, drilled into one organization
//! dcost --window lastweek --filter org=research
//!
//! # Today's sub-day series as JSON
//! dcost report --window today --json
//!
//! # Organizations with spend in the last 30 days
//! dcost orgs
//! ```

use clap::{Parser, Subcommand};
use dcost_core::filters::FilterSelection;
use dcost_core::types::TimeWindow;

/// Report compute platform spend from the cost service
#[derive(Parser, Debug, Clone)]
#[command(name = "dcost")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Show informational output (default is quiet mode with only warnings and errors)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Time window: 30d, 15d, 14d, lastweek or today
    #[arg(long, short = 'w', default_value_t = TimeWindow::default(), global = true)]
    pub window: TimeWindow,

    /// Drill-down filter as <dimension>=<value> (dimension: project, user, org)
    #[arg(long, short = 'f', global = true)]
    pub filter: Option<FilterSelection>,

    /// Timezone for execution times (e.g. "America/New_York", "local"); defaults to UTC
    #[arg(long, short = 'z', global = true)]
    pub timezone: Option<String>,

    /// Use UTC for execution times (overrides --timezone)
    #[arg(long, global = true)]
    pub utc: bool,

    /// Platform API host, used to find the cost service namespace
    #[arg(long, env = "DOMINO_API_HOST", global = true)]
    pub api_host: Option<String>,

    /// Platform API proxy serving authentication tokens
    #[arg(long, env = "DOMINO_API_PROXY", global = true)]
    pub api_proxy: Option<String>,

    /// Cost service base URL (overrides the namespace lookup)
    #[arg(long, env = "DOMINO_COST_URL", global = true)]
    pub cost_url: Option<String>,

    /// Static token for the cost service (skips the API proxy)
    #[arg(long, env = "DOMINO_API_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,

    /// Spend limit per project in USD
    #[arg(long, env = "DOMINO_PROJECT_MAX_SPEND", default_value = "8", global = true)]
    pub project_max_spend: f64,

    /// Spend limit per organization in USD
    #[arg(long, env = "DOMINO_ORG_MAX_SPEND", default_value = "500", global = true)]
    pub org_max_spend: f64,

    /// Re-run the report periodically until Ctrl-C
    #[arg(long, global = true)]
    pub watch: bool,

    /// Refresh interval in seconds for watch mode
    #[arg(long, default_value = "60", global = true)]
    pub interval: u64,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Show the cost report (default)
    Report,
    /// List organizations with spend in the last 30 days
    Orgs,
}

impl Cli {
    /// Command to run, `report` when none was given
    pub fn selected_command(&self) -> Command {
        self.command.unwrap_or(Command::Report)
    }
}
