#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Standalone binary for the accident dashboard API server.
//!
//! Reads configuration from `ACCIDENT_MAP_CONFIG` (or the embedded Lisbon
//! defaults) plus the `ACCIDENTS_CSV`, `BOUNDARY_GEOJSON`, `BIND_ADDR` and
//! `PORT` overrides.

use accident_map_config::AppConfig;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = AppConfig::load(None)?;
    accident_map_server::start(config).await?;
    Ok(())
}
