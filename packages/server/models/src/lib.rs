#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the accident dashboard server.
//!
//! These types are serialized to JSON for the REST API. They are separate
//! from the derived record types to allow independent evolution of the API
//! contract.

use accident_map_accident_models::{Accident, Month, Weekday};
use accident_map_analytics_models::{
    AggregationRequest, FilterDomains, FilterSpec, Overview,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the server is healthy.
    pub healthy: bool,
    /// Server version.
    pub version: String,
}

/// An accident as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiAccident {
    /// Accident identifier.
    pub id: String,
    /// Day of the month, if known.
    pub day: Option<u8>,
    /// Month, if recognised.
    pub month: Option<Month>,
    /// Weekday, if recognised.
    pub weekday: Option<Weekday>,
    /// Hour of the day, if known.
    pub hour: Option<u8>,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
    /// Minor injuries within 30 days.
    pub minor_injuries: Option<u32>,
    /// Serious injuries within 30 days.
    pub serious_injuries: Option<u32>,
    /// Fatalities within 30 days.
    pub fatalities: Option<u32>,
    /// Total victims.
    pub total_victims: u32,
    /// Municipality.
    pub municipality: Option<String>,
    /// Calendar date (ISO 8601).
    pub date: Option<NaiveDate>,
    /// Display date (`DD/MM/YYYY`).
    pub date_str: Option<String>,
}

impl From<&Accident> for ApiAccident {
    fn from(a: &Accident) -> Self {
        Self {
            id: a.id.clone(),
            day: a.day,
            month: a.month,
            weekday: a.weekday,
            hour: a.hour,
            latitude: a.latitude,
            longitude: a.longitude,
            minor_injuries: a.minor_injuries_30d,
            serious_injuries: a.serious_injuries_30d,
            fatalities: a.fatalities_30d,
            total_victims: a.total_victims,
            municipality: a.municipality.clone(),
            date: a.date,
            date_str: a.date_str.clone(),
        }
    }
}

/// Body of `POST /api/accidents`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentsRequest {
    /// Filter selection.
    #[serde(default)]
    pub filters: FilterSpec,
    /// Maximum number of accidents to return.
    pub limit: Option<usize>,
    /// Number of matching accidents to skip.
    pub offset: Option<usize>,
}

/// Response of `POST /api/accidents`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccidentsResponse {
    /// Number of accidents matching the filters.
    pub total: usize,
    /// Totals over the matching accidents.
    pub overview: Overview,
    /// The requested page of matching accidents.
    pub accidents: Vec<ApiAccident>,
}

/// Body of `POST /api/chart`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRequest {
    /// Filter selection.
    #[serde(default)]
    pub filters: FilterSpec,
    /// Breakdown, metrics and plot type.
    #[serde(flatten)]
    pub aggregation: AggregationRequest,
}

/// Body of `POST /api/map`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapRequest {
    /// Filter selection.
    #[serde(default)]
    pub filters: FilterSpec,
}

/// Response of `GET /api/overview`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiOverview {
    /// City shown on the dashboard.
    pub city: String,
    /// Year the dates belong to.
    pub year: i32,
    /// Totals over the whole dataset.
    pub overview: Overview,
    /// One-sentence summary.
    pub summary: String,
    /// First rows of the dataset.
    pub preview: Vec<ApiAccident>,
}

/// Response of `GET /api/domains`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDomains {
    /// Observed values of every filterable column.
    pub domains: FilterDomains,
    /// Initial filter selection built from the domains.
    pub defaults: FilterSpec,
}

#[cfg(test)]
mod tests {
    use accident_map_analytics_models::{Breakdown, Metric, PlotType};

    use super::*;

    #[test]
    fn chart_request_flattens_aggregation() {
        let req: ChartRequest = serde_json::from_value(serde_json::json!({
            "breakdown": "weekday",
            "metrics": [{ "type": "count" }, { "type": "sum", "column": "total_victims" }],
            "plotType": "Line"
        }))
        .unwrap();
        assert_eq!(req.aggregation.breakdown, Breakdown::Weekday);
        assert_eq!(req.aggregation.metrics.len(), 2);
        assert_eq!(req.aggregation.metrics[0], Metric::Count);
        assert_eq!(req.aggregation.plot_type, PlotType::Line);
        assert!(req.filters.predicates.is_empty());
    }

    #[test]
    fn accidents_request_defaults() {
        let req: AccidentsRequest = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(req.filters.predicates.is_empty());
        assert!(req.limit.is_none());
    }
}
