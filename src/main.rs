//! dcost - Report compute platform spend from the cost service

use clap::Parser;
use colored::*;
use dcost::{
    cli::{Cli, Command},
    config::AppConfig,
    live_monitor::LiveMonitor,
    orchestrator::{DashboardSession, FetchOrchestrator},
};
use dcost_core::error::Result;
use dcost_terminal::get_formatter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Spinner on stderr while a fetch is in flight
fn fetch_spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]")
    {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::from_cli(&cli)?;
    info!("Using timezone: {}", config.timezone.display_name());

    let orchestrator = Arc::new(FetchOrchestrator::new(
        config.record_source(),
        config.timezone.tz,
    ));
    let formatter = get_formatter(cli.json);
    let show_progress = !cli.json && !cli.watch && is_terminal::is_terminal(std::io::stderr());

    match cli.selected_command() {
        Command::Orgs => {
            info!("Listing organizations");
            let spinner = show_progress.then(|| fetch_spinner("Fetching organizations"));
            let organizations = orchestrator.organizations().await;
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            println!("{}", formatter.format_organizations(&organizations?));
        }
        Command::Report => {
            let mut session = DashboardSession::new(cli.window);
            let next = cli
                .filter
                .as_ref()
                .map(|f| session.drill_down(f.dimension, f.value.clone()));

            if cli.watch {
                info!("Starting live monitoring mode");
                let monitor =
                    LiveMonitor::new(orchestrator, session, config.limits, cli.json, cli.interval);
                return monitor.run().await;
            }

            info!("Running {} cost report", cli.window);
            let spinner = show_progress.then(|| fetch_spinner("Fetching cost data"));
            let dashboard = orchestrator.build_dashboard(&session, config.limits).await;
            if let Some(pb) = spinner {
                pb.finish_and_clear();
            }
            println!("{}", formatter.format_dashboard(&dashboard?));

            if let Some(next) = next
                && !cli.json
            {
                eprintln!(
                    "Hint: break down further with --filter {}=<value>",
                    next.to_string().to_lowercase()
                );
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging. --verbose switches from warnings only to info.
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("dcost=info"))
    } else {
        tracing_subscriber::EnvFilter::new("warn")
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli).await {
        let message = e.user_message();
        if is_terminal::is_terminal(std::io::stderr()) {
            eprintln!("{}", message.red());
        } else {
            eprintln!("{message}");
        }
        std::process::exit(1);
    }
}
