//! Interactive menu for the accident dashboard.
//!
//! Provides a menu-driven interface using `dialoguer` so the dashboard's
//! choices (filters, breakdown, metrics, plot type) can be made without
//! memorizing CLI flags.

use std::collections::BTreeSet;
use std::error::Error;
use std::path::PathBuf;

use accident_map_accident_models::{Month, NumericColumn, Weekday};
use accident_map_analytics::domain::filter_domains;
use accident_map_analytics_models::{
    AggregationRequest, Breakdown, FilterRule, FilterSpec, Metric, NumericRange, PlotType,
};
use accident_map_cli_utils::MultiProgress;
use accident_map_config::AppConfig;
use accident_map_ingest::Dataset;
use accident_map_ingest::derive::DATE_DISPLAY_FORMAT;
use chrono::NaiveDate;
use dialoguer::{Confirm, Input, MultiSelect, Select};

use crate::commands;

/// Top-level actions available in the interactive menu.
enum Tool {
    Overview,
    Plot,
    Map,
    Server,
}

impl Tool {
    const ALL: &[Self] = &[Self::Overview, Self::Plot, Self::Map, Self::Server];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Overview => "Dataset overview",
            Self::Plot => "Plot accidents",
            Self::Map => "Export map view",
            Self::Server => "Start server",
        }
    }
}

/// Runs the interactive menu.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected action fails.
pub async fn run(multi: &MultiProgress, config: AppConfig) -> Result<(), Box<dyn Error>> {
    println!("Lisbon Road Accidents");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Overview => {
            let dataset = commands::load_dataset(&config, multi)?;
            commands::overview(&config, &dataset, config.dataset.preview_rows);
        }
        Tool::Plot => {
            let dataset = commands::load_dataset(&config, multi)?;
            let filters = prompt_filters(&dataset)?;
            let request = prompt_aggregation()?;
            let output: String = Input::new()
                .with_prompt("Write chart spec to (empty for stdout)")
                .allow_empty(true)
                .interact_text()?;
            let output = (!output.trim().is_empty()).then(|| PathBuf::from(output.trim()));
            commands::plot_chart(&dataset, &filters, &request, output.as_deref())?;
        }
        Tool::Map => {
            let dataset = commands::load_dataset(&config, multi)?;
            let filters = prompt_filters(&dataset)?;
            let output: String = Input::new()
                .with_prompt("Output file")
                .default("map.json".to_string())
                .interact_text()?;
            let boundary = commands::load_boundary(&config, multi).await?;
            commands::export_map(&config, &dataset, &boundary, &filters, &PathBuf::from(output))?;
        }
        Tool::Server => commands::serve(config, true).await?,
    }

    Ok(())
}

/// Walks through the temporal, location and severity filters.
///
/// Each group is offered as a yes/no first; declined groups add no
/// predicates.
fn prompt_filters(dataset: &Dataset) -> Result<FilterSpec, Box<dyn Error>> {
    let domains = filter_domains(dataset.accidents());
    let mut spec = FilterSpec::new();

    if Confirm::new()
        .with_prompt("Filter by weekday and month?")
        .default(false)
        .interact()?
    {
        let weekdays: Vec<Weekday> = pick("Weekdays", &domains.weekdays)?;
        let months: Vec<Month> = pick("Months", &domains.months)?;
        spec = spec
            .with(FilterRule::Weekdays {
                allowed: weekdays.into_iter().collect(),
            })
            .with(FilterRule::Months {
                allowed: months.into_iter().collect(),
            });
    }

    if Confirm::new()
        .with_prompt("Filter by hour and day range?")
        .default(false)
        .interact()?
    {
        for column in [NumericColumn::Hour, NumericColumn::Day] {
            if let Some(range) = domains.ranges.get(&column) {
                spec = spec.with(prompt_range(column, *range)?);
            }
        }
    }

    if let Some(dates) = domains.dates
        && Confirm::new()
            .with_prompt("Filter between dates?")
            .default(false)
            .interact()?
    {
        let start = prompt_date("From date", dates.start)?;
        let end = prompt_date("To date", dates.end)?;
        spec = spec.with(FilterRule::DateInterval { start, end });
    }

    if !domains.municipalities.is_empty()
        && Confirm::new()
            .with_prompt("Filter by municipality?")
            .default(false)
            .interact()?
    {
        let municipalities: Vec<String> = pick("Municipalities", &domains.municipalities)?;
        spec = spec.with(FilterRule::Municipalities {
            allowed: municipalities.into_iter().collect(),
        });
    }

    if Confirm::new()
        .with_prompt("Filter by severity?")
        .default(false)
        .interact()?
    {
        for &column in NumericColumn::severities() {
            let Some(range) = domains.ranges.get(&column) else {
                continue;
            };
            if Confirm::new()
                .with_prompt(format!("Only accidents with zero {column}?"))
                .default(false)
                .interact()?
            {
                spec = spec.with(FilterRule::ExactZero { column });
                continue;
            }
            spec = spec.with(prompt_range(column, *range)?);
        }
    }

    Ok(spec)
}

/// Asks for inclusive bounds on `column`, defaulting to its observed range.
fn prompt_range(column: NumericColumn, range: NumericRange) -> Result<FilterRule, Box<dyn Error>> {
    let lo: u32 = Input::new()
        .with_prompt(format!("Minimum {column}"))
        .default(range.min)
        .interact_text()?;
    let hi: u32 = Input::new()
        .with_prompt(format!("Maximum {column}"))
        .default(range.max)
        .interact_text()?;
    Ok(FilterRule::Range { column, lo, hi })
}

fn prompt_date(prompt: &str, default: NaiveDate) -> Result<NaiveDate, Box<dyn Error>> {
    let text: String = Input::new()
        .with_prompt(format!("{prompt} (DD/MM/YYYY)"))
        .default(default.format(DATE_DISPLAY_FORMAT).to_string())
        .validate_with(|input: &String| parse_date_input(input).map(|_| ()))
        .interact_text()?;
    Ok(parse_date_input(&text)?)
}

/// Parses a date typed as `DD/MM/YYYY` (the display format) or ISO
/// `YYYY-MM-DD`.
fn parse_date_input(input: &str) -> Result<NaiveDate, String> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, DATE_DISPLAY_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .map_err(|_| format!("'{input}' is not a date (expected DD/MM/YYYY)"))
}

/// Multi-select over `options`, all pre-selected.
fn pick<T: Clone + ToString>(prompt: &str, options: &[T]) -> Result<Vec<T>, Box<dyn Error>> {
    let labels: Vec<String> = options.iter().map(ToString::to_string).collect();
    let defaults = vec![true; options.len()];
    let chosen = MultiSelect::new()
        .with_prompt(prompt)
        .items(&labels)
        .defaults(&defaults)
        .interact()?;
    Ok(chosen.into_iter().map(|i| options[i].clone()).collect())
}

fn prompt_aggregation() -> Result<AggregationRequest, Box<dyn Error>> {
    let breakdowns = Breakdown::all();
    let labels: Vec<&str> = breakdowns.iter().map(|b| b.pretty()).collect();
    let idx = Select::new()
        .with_prompt("Breakdown by")
        .items(&labels)
        .default(0)
        .interact()?;
    let breakdown = breakdowns[idx];

    let metrics = Metric::all();
    let labels: Vec<&str> = metrics.iter().map(|m| m.label()).collect();
    let mut defaults = vec![false; metrics.len()];
    defaults[0] = true;
    let chosen: BTreeSet<usize> = MultiSelect::new()
        .with_prompt("Metric(s)")
        .items(&labels)
        .defaults(&defaults)
        .interact()?
        .into_iter()
        .collect();
    let metrics: Vec<Metric> = chosen.into_iter().map(|i| metrics[i]).collect();

    let plot_types = [PlotType::Bar, PlotType::Line, PlotType::Pie];
    let idx = Select::new()
        .with_prompt("Plot type")
        .items(&plot_types)
        .default(0)
        .interact()?;

    Ok(AggregationRequest {
        breakdown,
        metrics,
        plot_type: plot_types[idx],
    })
}
