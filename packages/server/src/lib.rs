#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the accident dashboard.
//!
//! Loads the accident dataset and city boundary once at startup and serves
//! them read-only. Every filter, chart and map request is recomputed from
//! the request body against that shared state; nothing is cached or
//! written between requests.

mod handlers;
pub mod interactive;

use std::sync::Arc;

use accident_map_analytics::chart::{ChartRenderer, VegaLiteRenderer};
use accident_map_config::{AppConfig, ConfigError};
use accident_map_geography::{Boundary, GeographyError, load_boundary};
use accident_map_ingest::{Dataset, IngestError};
use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use thiserror::Error;

/// Errors that can stop the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The accident dataset could not be loaded.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    /// The city boundary could not be loaded.
    #[error(transparent)]
    Geography(#[from] GeographyError),

    /// The HTTP server failed to bind or run.
    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// The session's accidents.
    pub dataset: Arc<Dataset>,
    /// City limits for the map overlay and fallback center.
    pub boundary: Arc<Boundary>,
    /// Session configuration.
    pub config: Arc<AppConfig>,
    /// Chart renderer used by `/api/chart`.
    pub renderer: Arc<dyn ChartRenderer>,
}

impl AppState {
    /// Wraps already-loaded session data with the Vega-Lite renderer.
    #[must_use]
    pub fn new(dataset: Dataset, boundary: Boundary, config: AppConfig) -> Self {
        Self {
            dataset: Arc::new(dataset),
            boundary: Arc::new(boundary),
            config: Arc::new(config),
            renderer: Arc::new(VegaLiteRenderer),
        }
    }

    /// Loads the dataset and boundary described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if either the CSV or the boundary cannot be
    /// loaded.
    pub async fn load(config: AppConfig) -> Result<Self, ServerError> {
        log::info!("Loading accidents from {}", config.dataset.path.display());
        let dataset = Dataset::load(&config.dataset)?;

        let boundary = load_boundary(&config.boundary).await?;
        log::info!(
            "Loaded boundary with {} record(s)",
            boundary.records.len()
        );

        Ok(Self::new(dataset, boundary, config))
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/overview", web::get().to(handlers::overview))
            .route("/inspection", web::get().to(handlers::inspection))
            .route("/domains", web::get().to(handlers::domains))
            .route("/accidents", web::post().to(handlers::accidents))
            .route("/chart", web::post().to(handlers::chart))
            .route("/map", web::post().to(handlers::map)),
    );
}

/// Starts the dashboard API server on the configured address.
///
/// This is a regular async function; the caller provides the runtime
/// (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server(state: AppState) -> std::io::Result<()> {
    let bind_addr = state.config.server.bind_addr.clone();
    let port = state.config.server.port;
    let state = web::Data::new(state);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}

/// Loads session state from `config` and serves it.
///
/// # Errors
///
/// Returns [`ServerError`] if loading fails or the server cannot run.
#[allow(clippy::future_not_send)]
pub async fn start(config: AppConfig) -> Result<(), ServerError> {
    let state = AppState::load(config).await?;
    run_server(state).await?;
    Ok(())
}
