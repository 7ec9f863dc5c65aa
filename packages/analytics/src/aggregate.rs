//! Aggregation and validation stage.

use std::collections::BTreeMap;

use accident_map_accident_models::Accident;
use accident_map_analytics_models::{
    AggregatedRow, Aggregation, AggregationRequest, Breakdown, BreakdownKey, Metric, PlotType,
    ValidationError,
};

/// Checks the metric selection against the plot type.
///
/// # Errors
///
/// * [`ValidationError::NoMetrics`] if no metric is selected
/// * [`ValidationError::PieRequiresSingleMetric`] if a pie chart has more
///   than one metric
pub fn validate(request: &AggregationRequest) -> Result<(), ValidationError> {
    if request.metrics.is_empty() {
        return Err(ValidationError::NoMetrics);
    }
    if request.plot_type == PlotType::Pie && request.metrics.len() != 1 {
        return Err(ValidationError::PieRequiresSingleMetric {
            selected: request.metrics.len(),
        });
    }
    Ok(())
}

/// Groups `view` by the requested breakdown and computes every metric.
///
/// Only observed keys produce rows. Accidents without a key for the
/// breakdown (unknown month, no date, no municipality) are left out.
///
/// # Errors
///
/// Returns the [`ValidationError`] from [`validate`] without aggregating.
pub fn aggregate(
    view: &[&Accident],
    request: &AggregationRequest,
) -> Result<Aggregation, ValidationError> {
    validate(request)?;

    let keyed: Vec<(BreakdownKey, &Accident)> = view
        .iter()
        .filter_map(|a| request.breakdown.key(a).map(|k| (k, *a)))
        .collect();

    let skipped = view.len() - keyed.len();
    if skipped > 0 {
        log::debug!(
            "{skipped} row(s) have no {} and are left out of the aggregation",
            request.breakdown
        );
    }

    let mut rows = Vec::new();
    for metric in &request.metrics {
        let mut groups: BTreeMap<&BreakdownKey, u64> = BTreeMap::new();
        for (key, accident) in &keyed {
            *groups.entry(key).or_default() += metric_value(*metric, accident);
        }
        rows.extend(groups.into_iter().map(|(key, value)| AggregatedRow {
            key: key.clone(),
            metric: metric.label().to_string(),
            value,
        }));
    }

    // Stable: within a key, metrics stay in selection order.
    rows.sort_by(|a, b| a.key.cmp(&b.key));

    Ok(Aggregation {
        breakdown: request.breakdown,
        plot_type: request.plot_type,
        metric_labels: request
            .metrics
            .iter()
            .map(|m| m.label().to_string())
            .collect(),
        rows,
        title: title(request.breakdown, &request.metrics, request.plot_type),
    })
}

fn metric_value(metric: Metric, accident: &Accident) -> u64 {
    match metric {
        Metric::Count => 1,
        Metric::Sum(column) => u64::from(column.value(accident)),
    }
}

/// Chart title, e.g. `"Fatalities by Month - Bar plot"` or
/// `"Metrics (Minor injuries, Fatalities) by Hour - Line plot"`.
#[must_use]
pub fn title(breakdown: Breakdown, metrics: &[Metric], plot_type: PlotType) -> String {
    let labels: Vec<&str> = metrics.iter().map(|m| m.label()).collect();
    let subject = match (plot_type, labels.as_slice()) {
        (_, []) => "Metrics".to_string(),
        (PlotType::Pie, [first, ..]) | (_, [first]) => (*first).to_string(),
        _ => format!("Metrics ({})", labels.join(", ")),
    };
    format!("{subject} by {} - {plot_type} plot", breakdown.pretty())
}
