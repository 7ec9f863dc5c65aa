//! Chart rendering.
//!
//! The built-in [`VegaLiteRenderer`] emits a Vega-Lite v5 specification
//! that any Vega-Lite embed can draw. Keys are passed with an explicit sort
//! order so months and weekdays stay in calendar order on the axis.

use accident_map_analytics_models::{Aggregation, Chart, PlotType, RenderError};
use serde_json::{Value, json};

const SCHEMA: &str = "https://vega.github.io/schema/vega-lite/v5.json";

/// Turns a validated aggregation into a displayable chart.
pub trait ChartRenderer: Send + Sync {
    /// Renders `aggregation`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the chart cannot be drawn.
    fn render(&self, aggregation: &Aggregation) -> Result<Chart, RenderError>;
}

/// Renders Vega-Lite JSON specifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct VegaLiteRenderer;

impl ChartRenderer for VegaLiteRenderer {
    fn render(&self, aggregation: &Aggregation) -> Result<Chart, RenderError> {
        let spec = match aggregation.plot_type {
            PlotType::Bar => bar(aggregation)?,
            PlotType::Line => line(aggregation)?,
            PlotType::Pie => pie(aggregation)?,
        };

        Ok(Chart {
            plot_type: aggregation.plot_type,
            title: aggregation.title.clone(),
            spec,
        })
    }
}

fn values(aggregation: &Aggregation, metric: Option<&str>) -> Result<Vec<Value>, RenderError> {
    aggregation
        .rows
        .iter()
        .filter(|r| metric.is_none_or(|m| r.metric == m))
        .map(|r| -> Result<Value, RenderError> {
            let key = to_json(&r.key)?;
            Ok(json!({ "key": key, "metric": r.metric, "value": r.value }))
        })
        .collect()
}

/// Distinct keys in row order, which is already the display order.
fn key_order(aggregation: &Aggregation) -> Result<Vec<Value>, RenderError> {
    let mut order: Vec<Value> = Vec::new();
    for row in &aggregation.rows {
        let key = to_json(&row.key)?;
        if order.last() != Some(&key) {
            order.push(key);
        }
    }
    Ok(order)
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, RenderError> {
    serde_json::to_value(value).map_err(|e| RenderError {
        message: e.to_string(),
    })
}

fn x_encoding(aggregation: &Aggregation) -> Result<Value, RenderError> {
    Ok(json!({
        "field": "key",
        "type": "ordinal",
        "title": aggregation.breakdown.pretty(),
        "sort": key_order(aggregation)?,
    }))
}

fn color_encoding(aggregation: &Aggregation) -> Value {
    json!({
        "field": "metric",
        "type": "nominal",
        "title": "Metric",
        "sort": aggregation.metric_labels,
    })
}

fn bar(aggregation: &Aggregation) -> Result<Value, RenderError> {
    let x = x_encoding(aggregation)?;
    let color = color_encoding(aggregation);
    Ok(json!({
        "$schema": SCHEMA,
        "title": aggregation.title,
        "data": { "values": values(aggregation, None)? },
        "encoding": {
            "x": x,
            "xOffset": { "field": "metric", "sort": aggregation.metric_labels },
            "y": { "field": "value", "type": "quantitative", "title": "Value" },
            "color": color,
        },
        "layer": [
            { "mark": "bar" },
            {
                "mark": { "type": "text", "baseline": "bottom", "dy": -2 },
                "encoding": { "text": { "field": "value", "type": "quantitative" } }
            }
        ]
    }))
}

fn line(aggregation: &Aggregation) -> Result<Value, RenderError> {
    Ok(json!({
        "$schema": SCHEMA,
        "title": aggregation.title,
        "data": { "values": values(aggregation, None)? },
        "mark": { "type": "line", "point": true },
        "encoding": {
            "x": x_encoding(aggregation)?,
            "y": { "field": "value", "type": "quantitative", "title": "Value" },
            "color": color_encoding(aggregation),
        }
    }))
}

fn pie(aggregation: &Aggregation) -> Result<Value, RenderError> {
    let metric = aggregation
        .metric_labels
        .first()
        .ok_or_else(|| RenderError {
            message: "pie chart has no metric".to_string(),
        })?;
    let data = values(aggregation, Some(metric.as_str()))?;

    Ok(json!({
        "$schema": SCHEMA,
        "title": aggregation.title,
        "data": { "values": data },
        "mark": { "type": "arc", "tooltip": true },
        "encoding": {
            "theta": { "field": "value", "type": "quantitative", "stack": true },
            "color": {
                "field": "key",
                "type": "nominal",
                "title": aggregation.breakdown.pretty(),
                "sort": key_order(aggregation)?,
            },
            "order": { "field": "value", "type": "quantitative", "sort": "descending" }
        }
    }))
}

#[cfg(test)]
mod tests {
    use accident_map_accident_models::{Accident, VictimColumn};
    use accident_map_analytics_models::{AggregationRequest, Breakdown, Metric};

    use super::*;
    use crate::aggregate::aggregate;
    use crate::fixtures::{accidents, three_rows};

    fn render(
        data: &[Accident],
        breakdown: Breakdown,
        metrics: Vec<Metric>,
        plot_type: PlotType,
    ) -> Result<Chart, RenderError> {
        let view: Vec<&Accident> = data.iter().collect();
        let aggregation = aggregate(
            &view,
            &AggregationRequest {
                breakdown,
                metrics,
                plot_type,
            },
        )
        .unwrap();
        VegaLiteRenderer.render(&aggregation)
    }

    #[test]
    fn bar_has_value_labels_and_calendar_sort() {
        let chart = render(
            &three_rows(),
            Breakdown::Month,
            vec![Metric::Count, Metric::Sum(VictimColumn::Fatalities)],
            PlotType::Bar,
        )
        .unwrap();

        assert_eq!(chart.plot_type, PlotType::Bar);
        assert_eq!(chart.spec["encoding"]["x"]["sort"], json!(["Jan", "Feb"]));
        assert_eq!(chart.spec["encoding"]["x"]["title"], "Month");
        assert_eq!(chart.spec["encoding"]["y"]["title"], "Value");
        assert_eq!(chart.spec["layer"][1]["mark"]["type"], "text");
        assert_eq!(chart.spec["data"]["values"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn line_has_point_markers() {
        let chart = render(
            &three_rows(),
            Breakdown::Hour,
            vec![Metric::Count],
            PlotType::Line,
        )
        .unwrap();
        assert_eq!(chart.spec["mark"]["point"], true);
        assert_eq!(chart.spec["encoding"]["x"]["sort"], json!([8, 17, 22]));
    }

    #[test]
    fn pie_uses_first_metric() {
        let chart = render(
            &three_rows(),
            Breakdown::Weekday,
            vec![Metric::Sum(VictimColumn::Fatalities)],
            PlotType::Pie,
        )
        .unwrap();
        assert_eq!(chart.spec["mark"]["type"], "arc");
        let values = chart.spec["data"]["values"].as_array().unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0]["key"], "Monday");
        assert_eq!(values[0]["value"], 3);
    }

    #[test]
    fn all_zero_pie_renders_with_its_zero_slices() {
        let data = accidents(&[("1", 1, "Jan", "Monday", 1, [Some(0), Some(0), Some(0)])]);
        let chart = render(
            &data,
            Breakdown::Month,
            vec![Metric::Sum(VictimColumn::Fatalities)],
            PlotType::Pie,
        )
        .unwrap();
        assert_eq!(chart.spec["mark"]["type"], "arc");
        let values = chart.spec["data"]["values"].as_array().unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0]["value"], 0);
    }

    #[test]
    fn empty_pie_renders_without_data() {
        let chart = render(&[], Breakdown::Month, vec![Metric::Count], PlotType::Pie).unwrap();
        assert_eq!(chart.spec["data"]["values"], json!([]));
        assert_eq!(chart.spec["encoding"]["color"]["sort"], json!([]));
    }
}
