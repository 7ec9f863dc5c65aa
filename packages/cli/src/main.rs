#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command line front end for the Lisbon road accident dashboard.
//!
//! Subcommands print the dataset overview, render a chart, export the map
//! view or start the API server. Without a subcommand an interactive menu
//! walks through the same choices.
//!
//! Uses `indicatif-log-bridge` (via [`accident_map_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and spinners never fight for the terminal.

mod commands;
mod interactive;

use std::path::PathBuf;
use std::str::FromStr;

use accident_map_accident_models::VictimColumn;
use accident_map_analytics_models::{AggregationRequest, Breakdown, Metric, PlotType};
use accident_map_config::AppConfig;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "accident_map", about = "Lisbon road accident dashboard")]
struct Cli {
    /// TOML config file (defaults to `ACCIDENT_MAP_CONFIG`, then the
    /// embedded Lisbon config)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dataset inspection, headline totals and a preview
    Overview {
        /// Number of preview rows (defaults to the configured value)
        #[arg(long)]
        preview: Option<usize>,
    },
    /// Aggregate the filtered accidents and render a Vega-Lite chart
    Plot {
        /// Breakdown dimension (month, weekday, hour, day, date, municipality)
        #[arg(long, default_value = "month")]
        breakdown: Breakdown,
        /// Comma-separated metrics: `count` or a victim column such as
        /// `fatalities_30d` or `total_victims`
        #[arg(long, value_delimiter = ',', value_parser = parse_metric, default_value = "count")]
        metrics: Vec<Metric>,
        /// Plot type (bar, line, pie)
        #[arg(long = "plot-type", default_value = "bar")]
        plot_type: PlotType,
        /// JSON file with the filter selection
        #[arg(long)]
        filters: Option<PathBuf>,
        /// Write the chart spec here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Export the map view (markers, clusters, boundary) as JSON
    Map {
        /// JSON file with the filter selection
        #[arg(long)]
        filters: Option<PathBuf>,
        /// Output file
        #[arg(long, default_value = "map.json")]
        output: PathBuf,
    },
    /// Start the dashboard API server
    Serve,
}

/// Parses `count` or a victim column name into a [`Metric`].
fn parse_metric(s: &str) -> Result<Metric, String> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("count") {
        return Ok(Metric::Count);
    }
    VictimColumn::from_str(s)
        .map(Metric::Sum)
        .map_err(|_| format!("unknown metric '{s}'"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = accident_map_cli_utils::init_logger();
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    let Some(command) = cli.command else {
        return interactive::run(&multi, config).await;
    };

    match command {
        Commands::Overview { preview } => {
            let dataset = commands::load_dataset(&config, &multi)?;
            let rows = preview.unwrap_or(config.dataset.preview_rows);
            commands::overview(&config, &dataset, rows);
        }
        Commands::Plot {
            breakdown,
            metrics,
            plot_type,
            filters,
            output,
        } => {
            let filters = commands::read_filters(filters.as_deref())?;
            let dataset = commands::load_dataset(&config, &multi)?;
            let request = AggregationRequest {
                breakdown,
                metrics,
                plot_type,
            };
            commands::plot_chart(&dataset, &filters, &request, output.as_deref())?;
        }
        Commands::Map { filters, output } => {
            let filters = commands::read_filters(filters.as_deref())?;
            let dataset = commands::load_dataset(&config, &multi)?;
            let boundary = commands::load_boundary(&config, &multi).await?;
            commands::export_map(&config, &dataset, &boundary, &filters, &output)?;
        }
        Commands::Serve => commands::serve(config, false).await?,
    }

    Ok(())
}
