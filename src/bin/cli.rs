#![cfg(not(tarpaulin_include))]

use clap::Parser;
use expense_dashboard::config::{Args, DashboardConfig};
use expense_dashboard::sheet::SheetAggregator;
use expense_dashboard::summary::{DashboardData, MonthFilter};

/// Print the dashboard numbers to the terminal
///
/// Takes the same flags as the web server, plus an optional month (1-12)
/// as the last argument after `--`.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut raw: Vec<String> = std::env::args().collect();
    let month = match raw.iter().position(|a| a == "--") {
        Some(idx) => {
            let rest = raw.split_off(idx);
            rest.get(1).cloned()
        }
        None => None,
    };

    let config = DashboardConfig::from(Args::parse_from(raw));
    let sheets = SheetAggregator::new(
        reqwest::Client::new(),
        config.sheet_source(),
        config.read_timeout,
    );

    let table = match sheets.try_load().await {
        Ok(table) => table,
        Err(e) => {
            eprintln!("Sheet read error: {}", e);
            Default::default()
        }
    };
    let data = DashboardData::build(
        &table,
        MonthFilter::parse(month.as_deref()),
        config.trend_months,
    );

    println!("Rows: {}", table.len());
    println!("Total: {:.2}", data.total);

    println!("\nBy vendor");
    for v in &data.vendor {
        println!("  {:<30} {:>12.2}", v.tool, v.amount);
    }

    println!("\nBy department");
    for d in &data.department {
        println!("  {:<30} {:>12.2}", d.department, d.amount);
    }

    println!("\nTrend");
    for (label, value) in data.trend_months.iter().zip(&data.trend_values) {
        println!("  {:<10} {:>12.2}", label, value);
    }

    Ok(())
}
