#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Session configuration for the accident map dashboard.
//!
//! A default configuration for Lisbon is embedded at compile time from
//! `defaults/lisbon.toml`. A different TOML file can replace it (passed
//! explicitly or named by `ACCIDENT_MAP_CONFIG`), and a handful of
//! environment variables override individual values afterwards.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming an alternative TOML config file.
pub const CONFIG_ENV: &str = "ACCIDENT_MAP_CONFIG";

const DEFAULT_TOML: &str = include_str!("../defaults/lisbon.toml");

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The TOML document is malformed or missing fields.
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// An environment override holds an unusable value.
    #[error("Invalid value for {name}: {value}")]
    Override {
        /// Environment variable name.
        name: &'static str,
        /// The rejected value.
        value: String,
    },
}

/// Complete configuration for one dashboard session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    /// Accident dataset settings.
    pub dataset: DatasetConfig,
    /// City boundary settings.
    pub boundary: BoundaryConfig,
    /// Map rendering settings.
    pub map: MapConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
}

/// Where the accident CSV lives and how to interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DatasetConfig {
    /// Path to the accident CSV.
    pub path: PathBuf,
    /// Year used to assemble dates from day and month.
    #[serde(default = "default_year")]
    pub year: i32,
    /// Number of rows shown in the dataset preview.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

/// How the city boundary is obtained.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BoundaryConfig {
    /// Free-form place name passed to the geocoder.
    pub city: String,
    /// Nominatim search endpoint.
    pub nominatim_url: String,
    /// `User-Agent` sent to Nominatim (required by its usage policy).
    pub user_agent: String,
    /// Local `GeoJSON` file used instead of geocoding, if set.
    #[serde(default)]
    pub geojson_path: Option<PathBuf>,
    /// Douglas-Peucker tolerance in degrees for the map overlay.
    #[serde(default = "default_simplify_tolerance")]
    pub simplify_tolerance: f64,
}

/// Map styling and layout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapConfig {
    /// Initial zoom level.
    pub zoom: u8,
    /// Base tile layer name.
    pub tiles: String,
    /// Circle marker radius in pixels.
    pub marker_radius: f64,
    /// Circle marker color.
    pub marker_color: String,
    /// Circle marker fill opacity.
    pub marker_fill_opacity: f64,
    /// Fill color of the boundary overlay.
    pub boundary_fill: String,
    /// Markers closer than this (in degrees) are grouped into one cluster.
    pub cluster_radius: f64,
}

/// HTTP server binding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: String,
    /// Port to bind to.
    pub port: u16,
}

const fn default_year() -> i32 {
    2023
}

const fn default_preview_rows() -> usize {
    5
}

const fn default_simplify_tolerance() -> f64 {
    0.001
}

impl AppConfig {
    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is invalid.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Returns the embedded default (Lisbon) configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the embedded document is invalid.
    pub fn embedded() -> Result<Self, ConfigError> {
        Self::from_toml(DEFAULT_TOML)
    }

    /// Reads a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Resolves the session configuration.
    ///
    /// Uses `path` if given, otherwise the file named by
    /// [`CONFIG_ENV`], otherwise the embedded defaults. Environment
    /// overrides are applied last.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a file cannot be read or parsed, or an
    /// override is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);

        let mut config = match path.or(env_path.as_deref()) {
            Some(path) => {
                log::info!("Loading config from {}", path.display());
                Self::from_path(path)?
            }
            None => Self::embedded()?,
        };

        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Applies `ACCIDENTS_CSV`, `BOUNDARY_GEOJSON`, `BIND_ADDR` and `PORT`
    /// overrides looked up through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Override`] if `PORT` is not a valid port.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(path) = lookup("ACCIDENTS_CSV") {
            self.dataset.path = PathBuf::from(path);
        }
        if let Some(path) = lookup("BOUNDARY_GEOJSON") {
            self.boundary.geojson_path = Some(PathBuf::from(path));
        }
        if let Some(addr) = lookup("BIND_ADDR") {
            self.server.bind_addr = addr;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().map_err(|_| ConfigError::Override {
                name: "PORT",
                value: port.clone(),
            })?;
        }
        Ok(())
    }
}
