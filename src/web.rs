#![cfg(not(tarpaulin_include))]

use clap::Parser;
use expense_dashboard::app;
use expense_dashboard::config::{Args, DashboardConfig};

/// Main entry point for the dashboard web server
///
/// Reads flags / environment variables into a [`DashboardConfig`], sets up
/// logging (`RUST_LOG` overrides the default `info` level) and serves until
/// the process is stopped.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = DashboardConfig::from(Args::parse());
    app::run(config).await
}
