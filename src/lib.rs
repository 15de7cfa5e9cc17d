pub mod config;
pub mod core;
pub mod dashboard;
pub mod error;
pub mod fetcher;
pub mod indicators;
pub mod models;

pub use crate::core::resolver::SeriesResolver;
pub use crate::core::timeseries::percent_change;
pub use crate::dashboard::{Dashboard, MetricPanel, PanelStatus, TimeRange};
pub use crate::fetcher::DataProviderClient;
pub use crate::indicators::registry::{Category, Registry, RetrievalStrategy};
pub use crate::models::{DataPoint, MetricSeries};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tabled::{Table, Tabled};

use crate::config::AppConfig;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Lookback window
    #[arg(long, value_enum, default_value_t = TimeRange::OneYear)]
    pub range: TimeRange,

    /// Only this category (e.g. "Interest Rate")
    #[arg(long, conflicts_with = "metric")]
    pub category: Option<String>,

    /// Only this metric (exact name)
    #[arg(long)]
    pub metric: Option<String>,

    /// Print full panels as JSON instead of a summary table
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// List categories and metric definitions, then exit
    #[arg(long, default_value_t = false)]
    pub list: bool,
}

#[derive(Serialize)]
struct CategoryReport {
    category: &'static str,
    panels: Vec<MetricPanel>,
}

/// Compose config, providers, resolver and cache, then print the requested panels.
pub async fn run(cli: Cli) -> Result<()> {
    if cli.list {
        print_catalog();
        return Ok(());
    }

    // Without the macro-data credential nothing works: fail here, not per metric
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let resolver = SeriesResolver::new(DataProviderClient::from_config(&config));
    let dashboard = Dashboard::new(resolver, config.cache_ttl);

    let reports = match (&cli.metric, &cli.category) {
        (Some(metric), _) => {
            let category = Registry::get_metadata(metric)
                .map(|m| m.category.label())
                .unwrap_or("Uncataloged");
            vec![CategoryReport {
                category,
                panels: vec![dashboard.panel(metric, cli.range).await],
            }]
        }
        (None, Some(label)) => {
            let category = Category::from_label(label)
                .with_context(|| format!("Unknown category '{}'", label))?;
            vec![CategoryReport {
                category: category.label(),
                panels: dashboard.category_panels(category, cli.range).await,
            }]
        }
        (None, None) => {
            let mut reports = Vec::new();
            for category in Category::ALL {
                reports.push(CategoryReport {
                    category: category.label(),
                    panels: dashboard.category_panels(category, cli.range).await,
                });
            }
            reports
        }
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        print_summary(&reports, cli.range);
    }
    Ok(())
}

fn print_catalog() {
    for (category, metrics) in Registry::list_categories() {
        println!("\n== {} ==", category.label());
        for name in metrics {
            println!("  {:<32} {}", name, Registry::definition(name).unwrap_or_default());
        }
    }
}

fn fmt_opt(value: Option<f64>, suffix: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.2}{}", v, suffix),
        _ => "-".to_string(),
    }
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Latest")]
    latest: String,
    #[tabled(rename = "Change")]
    change: String,
    #[tabled(rename = "YoY")]
    yoy: String,
}

fn summary_rows(panels: &[MetricPanel]) -> Vec<SummaryRow> {
    panels
        .iter()
        .map(|panel| match panel.status {
            PanelStatus::Ready => SummaryRow {
                metric: panel.name.clone(),
                latest: fmt_opt(panel.latest_level(), ""),
                change: fmt_opt(panel.change, "%"),
                yoy: fmt_opt(panel.latest_growth(), "%"),
            },
            PanelStatus::Unavailable => SummaryRow {
                metric: panel.name.clone(),
                latest: "Unable to fetch data for this metric".to_string(),
                change: "-".to_string(),
                yoy: "-".to_string(),
            },
        })
        .collect()
}

fn print_summary(reports: &[CategoryReport], range: TimeRange) {
    println!("Economic Metrics ({})", range.label());
    for report in reports {
        println!("\n== {} ==", report.category);
        let table = Table::new(summary_rows(&report.panels)).to_string();
        println!("{}", table);
    }
    println!("\nData sources: Federal Reserve Economic Data (FRED), Yahoo Finance");
    println!("Last updated: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"));
}
