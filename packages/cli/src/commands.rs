//! The work behind each subcommand, shared with the interactive menu.

use std::error::Error;
use std::path::Path;

use accident_map_accident_models::Accident;
use accident_map_analytics::chart::VegaLiteRenderer;
use accident_map_analytics::{filter, plot, stats};
use accident_map_analytics_models::{AggregationRequest, FilterSpec, PlotOutcome};
use accident_map_cli_utils::{MultiProgress, Spinner};
use accident_map_config::AppConfig;
use accident_map_geography::Boundary;
use accident_map_ingest::Dataset;
use accident_map_spatial::build_map_view;

/// Loads the accident CSV behind a spinner.
///
/// # Errors
///
/// Returns an error if the CSV cannot be loaded.
pub fn load_dataset(config: &AppConfig, multi: &MultiProgress) -> Result<Dataset, Box<dyn Error>> {
    let spinner = Spinner::start(
        multi,
        &format!("Loading {}", config.dataset.path.display()),
    );
    match Dataset::load(&config.dataset) {
        Ok(dataset) => {
            spinner.finish(format!("Loaded {} accidents", dataset.len()));
            Ok(dataset)
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e.into())
        }
    }
}

/// Loads the city boundary behind a spinner.
///
/// # Errors
///
/// Returns an error if the boundary file or geocoding request fails.
pub async fn load_boundary(
    config: &AppConfig,
    multi: &MultiProgress,
) -> Result<Boundary, Box<dyn Error>> {
    let spinner = Spinner::start(multi, &format!("Loading boundary for {}", config.boundary.city));
    match accident_map_geography::load_boundary(&config.boundary).await {
        Ok(boundary) => {
            spinner.finish(format!(
                "Loaded boundary ({} record(s))",
                boundary.records.len()
            ));
            Ok(boundary)
        }
        Err(e) => {
            spinner.finish_and_clear();
            Err(e.into())
        }
    }
}

/// Reads a JSON filter selection, or the empty selection when no path is
/// given.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid filter
/// selection.
pub fn read_filters(path: Option<&Path>) -> Result<FilterSpec, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(FilterSpec::default());
    };
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Prints the dataset inspection, the overview sentence and a preview.
pub fn overview(config: &AppConfig, dataset: &Dataset, preview_rows: usize) {
    let inspection = dataset.inspection();
    println!();
    println!("Dataset inspection");
    println!("  Columns:        {}", inspection.columns);
    println!("  Rows:           {}", inspection.rows);
    println!("  Missing values: {}", inspection.missing_values);
    println!("  Duplicate rows: {}", inspection.duplicate_rows);
    println!("  Column names:   {}", inspection.column_names.join(", "));

    let all: Vec<&Accident> = dataset.accidents().iter().collect();
    let overview = stats::compute_overview(&all);
    println!();
    println!(
        "{}",
        stats::describe(&overview, dataset.year(), &config.boundary.city)
    );

    let preview = dataset.preview(preview_rows);
    if preview.is_empty() {
        return;
    }
    println!();
    println!(
        "{:<12} {:<10} {:<10} {:>4} {:>6} {:>8} {:>10}",
        "id", "date", "weekday", "hour", "minor", "serious", "fatalities"
    );
    for a in preview {
        println!(
            "{:<12} {:<10} {:<10} {:>4} {:>6} {:>8} {:>10}",
            a.id,
            a.date_str.as_deref().unwrap_or("-"),
            a.weekday.map_or_else(|| "-".to_string(), |w| w.to_string()),
            a.hour.map_or_else(|| "-".to_string(), |h| h.to_string()),
            count(a.minor_injuries_30d),
            count(a.serious_injuries_30d),
            count(a.fatalities_30d),
        );
    }
}

fn count(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_string(), |n| n.to_string())
}

/// Filters, aggregates and renders a chart, writing the Vega-Lite spec to
/// `output` (or stdout).
///
/// A rejected metric/plot combination is reported as a warning and is not
/// an error.
///
/// # Errors
///
/// Returns an error if rendering fails or the output cannot be written.
pub fn plot_chart(
    dataset: &Dataset,
    filters: &FilterSpec,
    request: &AggregationRequest,
    output: Option<&Path>,
) -> Result<(), Box<dyn Error>> {
    let view = filter::apply(dataset.accidents(), filters);
    log::info!("{} of {} accidents match the filters", view.len(), dataset.len());

    match plot(&view, request, &VegaLiteRenderer) {
        PlotOutcome::Rendered(chart) => {
            let json = serde_json::to_string_pretty(&chart.spec)?;
            match output {
                Some(path) => {
                    std::fs::write(path, json)?;
                    println!("{} -> {}", chart.title, path.display());
                }
                None => println!("{json}"),
            }
            Ok(())
        }
        PlotOutcome::Invalid(e) => {
            println!("Warning: {e}");
            Ok(())
        }
        PlotOutcome::Failed(e) => Err(e.into()),
    }
}

/// Filters the accidents and writes the map view as JSON to `output`.
///
/// # Errors
///
/// Returns an error if the map view cannot be built or written.
pub fn export_map(
    config: &AppConfig,
    dataset: &Dataset,
    boundary: &Boundary,
    filters: &FilterSpec,
    output: &Path,
) -> Result<(), Box<dyn Error>> {
    let view = filter::apply(dataset.accidents(), filters);
    let map = build_map_view(
        &view,
        boundary,
        &config.map,
        config.boundary.simplify_tolerance,
    )?;

    std::fs::write(output, serde_json::to_string(&map)?)?;
    println!(
        "Map with {} marker(s) in {} cluster(s) -> {}",
        map.markers.features.len(),
        map.clusters.len(),
        output.display()
    );
    Ok(())
}

/// Runs the API server on its own actix system.
///
/// The server uses actix-web's runtime, so it runs in a blocking task to
/// avoid nesting tokio runtimes.
///
/// # Errors
///
/// Returns an error if the server cannot load its data or bind.
pub async fn serve(config: AppConfig, interactive: bool) -> Result<(), Box<dyn Error>> {
    tokio::task::spawn_blocking(move || {
        let system = actix_web::rt::System::new();
        if interactive {
            system.block_on(accident_map_server::interactive::run(config))
        } else {
            system.block_on(accident_map_server::start(config))
        }
    })
    .await??;
    Ok(())
}
