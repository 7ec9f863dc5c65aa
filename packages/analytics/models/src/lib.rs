#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter, aggregation and chart types for the accident dashboard.
//!
//! These are the plain values the UI hands to the filter engine and the
//! aggregation stage on every interaction, and the results it gets back.
//! Nothing here holds state between interactions.

pub mod filter;

use std::collections::BTreeMap;

use accident_map_accident_models::{Accident, Month, NumericColumn, VictimColumn, Weekday};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

pub use filter::{FilterGroup, FilterPredicate, FilterRule, FilterSpec};

/// Dimension the aggregation groups by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Breakdown {
    /// Calendar month, in calendar order.
    Month,
    /// Day of the week, Monday first.
    Weekday,
    /// Hour of the day.
    Hour,
    /// Day of the month.
    Day,
    /// Calendar date; undated accidents are left out.
    Date,
    /// Municipality; accidents without one are left out.
    Municipality,
}

impl Breakdown {
    /// Capitalized name used in titles and axis labels.
    #[must_use]
    pub const fn pretty(self) -> &'static str {
        match self {
            Self::Month => "Month",
            Self::Weekday => "Weekday",
            Self::Hour => "Hour",
            Self::Day => "Day",
            Self::Date => "Date",
            Self::Municipality => "Municipality",
        }
    }

    /// Group key of `accident` along this dimension, `None` when the
    /// accident has no value for it.
    #[must_use]
    pub fn key(self, accident: &Accident) -> Option<BreakdownKey> {
        match self {
            Self::Month => accident.month.map(BreakdownKey::Month),
            Self::Weekday => accident.weekday.map(BreakdownKey::Weekday),
            Self::Hour => accident.hour.map(BreakdownKey::Hour),
            Self::Day => accident.day.map(BreakdownKey::Day),
            Self::Date => accident.date.map(BreakdownKey::Date),
            Self::Municipality => accident
                .municipality
                .clone()
                .map(BreakdownKey::Municipality),
        }
    }

    /// Returns all breakdown dimensions.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Month,
            Self::Weekday,
            Self::Hour,
            Self::Day,
            Self::Date,
            Self::Municipality,
        ]
    }
}

/// A single group key.
///
/// Within one aggregation every key has the same variant, so the derived
/// `Ord` sorts months and weekdays by the calendar and everything else by
/// natural value.
///
/// Serialized as the bare value for chart data. Hours and days are both
/// plain numbers on the wire, so keys are output-only.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum BreakdownKey {
    /// A month.
    Month(Month),
    /// A weekday.
    Weekday(Weekday),
    /// An hour (0-23).
    Hour(u8),
    /// A day of the month.
    Day(u8),
    /// A calendar date.
    Date(NaiveDate),
    /// A municipality name.
    Municipality(String),
}

impl std::fmt::Display for BreakdownKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Month(m) => write!(f, "{m}"),
            Self::Weekday(w) => write!(f, "{w}"),
            Self::Hour(h) | Self::Day(h) => write!(f, "{h}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Municipality(m) => f.write_str(m),
        }
    }
}

/// Quantity summarized per group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "column", rename_all = "snake_case")]
pub enum Metric {
    /// Number of accidents in the group.
    Count,
    /// Sum of a victim column over the group.
    Sum(VictimColumn),
}

impl Metric {
    /// Label shown in legends and titles.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Count => "Number of accidents",
            Self::Sum(column) => column.label(),
        }
    }

    /// Every metric the dashboard offers, count first.
    #[must_use]
    pub fn all() -> Vec<Self> {
        std::iter::once(Self::Count)
            .chain(VictimColumn::all().iter().copied().map(Self::Sum))
            .collect()
    }
}

/// Chart type requested by the user.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum PlotType {
    /// Grouped bars with value labels.
    Bar,
    /// One line per metric with point markers.
    Line,
    /// A single metric as slices.
    Pie,
}

/// What to aggregate and how it will be drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationRequest {
    /// Grouping dimension.
    pub breakdown: Breakdown,
    /// Metrics to compute, in display order.
    pub metrics: Vec<Metric>,
    /// Chart type.
    pub plot_type: PlotType,
}

/// One `(breakdown value, metric, value)` row of the tidy result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedRow {
    /// Group key.
    pub key: BreakdownKey,
    /// Metric label.
    pub metric: String,
    /// Count or sum for this group and metric.
    pub value: u64,
}

/// Validated, aggregated long-form table ready for charting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    /// Grouping dimension.
    pub breakdown: Breakdown,
    /// Chart type.
    pub plot_type: PlotType,
    /// Metric labels in selection order.
    pub metric_labels: Vec<String>,
    /// Rows sorted by key (calendar order for months and weekdays).
    pub rows: Vec<AggregatedRow>,
    /// Human-readable chart title.
    pub title: String,
}

/// Why a metric/plot combination was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "camelCase")]
pub enum ValidationError {
    /// No metric was selected.
    NoMetrics,
    /// Pie charts take exactly one metric.
    #[serde(rename_all = "camelCase")]
    PieRequiresSingleMetric {
        /// How many metrics were selected.
        selected: usize,
    },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoMetrics => f.write_str("Please select at least one metric."),
            Self::PieRequiresSingleMetric { selected } => write!(
                f,
                "Pie charts require exactly 1 metric ({selected} selected)."
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// A chart ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    /// Chart type.
    pub plot_type: PlotType,
    /// Chart title.
    pub title: String,
    /// Renderer-specific specification (Vega-Lite for the built-in renderer).
    pub spec: serde_json::Value,
}

/// The chart could not be produced from a valid aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderError {
    /// Description of the failure.
    pub message: String,
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "An error occurred during plotting: {}", self.message)
    }
}

impl std::error::Error for RenderError {}

/// Result of one plot interaction.
///
/// Lets callers tell "nothing to show" (a validation failure, which keeps
/// the previous display) apart from a failure while drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "camelCase")]
pub enum PlotOutcome {
    /// The chart was produced.
    Rendered(Chart),
    /// The request was rejected before aggregating.
    Invalid(ValidationError),
    /// Aggregation succeeded but drawing failed.
    Failed(RenderError),
}

/// Inclusive `[min, max]` of an integer column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericRange {
    /// Smallest observed value.
    pub min: u32,
    /// Largest observed value.
    pub max: u32,
}

/// Inclusive range of observed dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// Earliest date.
    pub start: NaiveDate,
    /// Latest date.
    pub end: NaiveDate,
}

/// Observed values of every filterable column, used as filter defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDomains {
    /// Weekdays present, Monday first.
    pub weekdays: Vec<Weekday>,
    /// Months present, January first.
    pub months: Vec<Month>,
    /// Municipalities present, alphabetically.
    pub municipalities: Vec<String>,
    /// Observed range of each numeric column that has any value.
    pub ranges: BTreeMap<NumericColumn, NumericRange>,
    /// Observed date range, if any accident has a valid date.
    pub dates: Option<DateRange>,
}

/// Headline totals over a set of accidents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    /// Number of accidents.
    pub accidents: u64,
    /// Total fatalities.
    pub fatalities: u64,
    /// Total serious injuries.
    pub serious_injuries: u64,
    /// Total minor injuries.
    pub minor_injuries: u64,
    /// Total victims.
    pub total_victims: u64,
    /// Accidents without a valid date.
    pub undated: u64,
}
