//! HTTP handler functions for the accident dashboard API.

use accident_map_accident_models::Accident;
use accident_map_analytics::{domain, filter, plot, stats};
use accident_map_analytics_models::PlotOutcome;
use accident_map_server_models::{
    AccidentsRequest, AccidentsResponse, ApiAccident, ApiDomains, ApiHealth, ApiOverview,
    ChartRequest, MapRequest,
};
use accident_map_spatial::build_map_view;
use actix_web::{HttpResponse, http::StatusCode, web};

use crate::AppState;

const DEFAULT_PAGE_SIZE: usize = 100;

/// `GET /api/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/overview`
///
/// Totals over the whole dataset, a summary sentence and the first rows.
pub async fn overview(state: web::Data<AppState>) -> HttpResponse {
    let dataset = &state.dataset;
    let all: Vec<&Accident> = dataset.accidents().iter().collect();
    let overview = stats::compute_overview(&all);
    let city = state.config.boundary.city.clone();

    HttpResponse::Ok().json(ApiOverview {
        summary: stats::describe(&overview, dataset.year(), &city),
        city,
        year: dataset.year(),
        overview,
        preview: dataset
            .preview(state.config.dataset.preview_rows)
            .iter()
            .map(ApiAccident::from)
            .collect(),
    })
}

/// `GET /api/inspection`
pub async fn inspection(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(state.dataset.inspection())
}

/// `GET /api/domains`
///
/// Observed filter domains and the initial filter selection.
pub async fn domains(state: web::Data<AppState>) -> HttpResponse {
    let domains = domain::filter_domains(state.dataset.accidents());
    let defaults = domain::default_spec(&domains);
    HttpResponse::Ok().json(ApiDomains { domains, defaults })
}

/// `POST /api/accidents`
///
/// Applies the filters and returns one page of matching accidents.
pub async fn accidents(
    state: web::Data<AppState>,
    body: web::Json<AccidentsRequest>,
) -> HttpResponse {
    let view = filter::apply(state.dataset.accidents(), &body.filters);
    let overview = stats::compute_overview(&view);

    let page = view
        .iter()
        .skip(body.offset.unwrap_or(0))
        .take(body.limit.unwrap_or(DEFAULT_PAGE_SIZE))
        .map(|a| ApiAccident::from(*a))
        .collect();

    HttpResponse::Ok().json(AccidentsResponse {
        total: view.len(),
        overview,
        accidents: page,
    })
}

/// `POST /api/chart`
///
/// Filters, aggregates and renders a chart. The body is always a
/// [`PlotOutcome`]; the status tells validation failures (422) apart from
/// rendering failures (500).
pub async fn chart(state: web::Data<AppState>, body: web::Json<ChartRequest>) -> HttpResponse {
    let view = filter::apply(state.dataset.accidents(), &body.filters);
    let outcome = plot(&view, &body.aggregation, state.renderer.as_ref());

    let status = match &outcome {
        PlotOutcome::Rendered(_) => StatusCode::OK,
        PlotOutcome::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PlotOutcome::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    HttpResponse::build(status).json(outcome)
}

/// `POST /api/map`
///
/// Filters and returns the map view (markers, clusters, boundary overlay).
pub async fn map(state: web::Data<AppState>, body: web::Json<MapRequest>) -> HttpResponse {
    let view = filter::apply(state.dataset.accidents(), &body.filters);

    match build_map_view(
        &view,
        &state.boundary,
        &state.config.map,
        state.config.boundary.simplify_tolerance,
    ) {
        Ok(map) => HttpResponse::Ok().json(map),
        Err(e) => {
            log::error!("Failed to build map view: {e}");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}
