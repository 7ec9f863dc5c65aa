#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter-and-aggregate pipeline behind the accident dashboard.
//!
//! Every user interaction runs the same steps over the read-only record
//! store: [`filter::apply`] narrows the accidents with the selected
//! predicates, [`aggregate::aggregate`] validates the metric/plot choice and
//! builds a tidy long-form table, and a [`chart::ChartRenderer`] turns that
//! table into something displayable. [`plot`] ties the last two together
//! into a single [`PlotOutcome`].

pub mod aggregate;
pub mod chart;
pub mod domain;
pub mod filter;
pub mod stats;

use accident_map_accident_models::Accident;
use accident_map_analytics_models::{AggregationRequest, PlotOutcome};

use crate::chart::ChartRenderer;

/// Validates, aggregates and renders `view` for one interaction.
///
/// Validation failures come back as [`PlotOutcome::Invalid`] without
/// touching the renderer; renderer failures as [`PlotOutcome::Failed`].
#[must_use]
pub fn plot(
    view: &[&Accident],
    request: &AggregationRequest,
    renderer: &dyn ChartRenderer,
) -> PlotOutcome {
    let aggregation = match aggregate::aggregate(view, request) {
        Ok(aggregation) => aggregation,
        Err(e) => {
            log::warn!("{e}");
            return PlotOutcome::Invalid(e);
        }
    };

    match renderer.render(&aggregation) {
        Ok(chart) => PlotOutcome::Rendered(chart),
        Err(e) => {
            log::error!("{e}");
            PlotOutcome::Failed(e)
        }
    }
}
