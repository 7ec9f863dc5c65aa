#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! City boundary loading and polygon reduction.
//!
//! The boundary comes either from the Nominatim search API
//! ([`nominatim`]) or from a local `GeoJSON` file ([`geojson_file`]).
//! Either way the geocoder may return several places or a multi-part
//! geometry; [`Boundary`] keeps every record for the map overlay and
//! reduces them to the single largest-area polygon for everything else.

pub mod geojson_file;
pub mod nominatim;

use std::path::PathBuf;

use accident_map_config::BoundaryConfig;
use geo::{Area, Centroid, MultiPolygon, Polygon, Simplify};
use geojson::GeoJson;
use thiserror::Error;

/// Errors that can occur while loading a boundary.
#[derive(Debug, Error)]
pub enum GeographyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A local boundary file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Response or file contents could not be interpreted.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// The geocoder found no place with a polygon for the query.
    #[error("No boundary polygon found for '{query}'")]
    NotFound {
        /// The place name that was searched.
        query: String,
    },
}

/// One place returned by the geocoder, with its full geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryRecord {
    /// Display name of the place.
    pub name: String,
    /// Representative latitude reported by the geocoder.
    pub latitude: f64,
    /// Representative longitude reported by the geocoder.
    pub longitude: f64,
    /// All polygon parts of the place.
    pub geometry: MultiPolygon<f64>,
}

/// The city limits used by the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    /// Every place the geocoder returned.
    pub records: Vec<BoundaryRecord>,
    /// Largest-area polygon across all records.
    pub polygon: Polygon<f64>,
}

impl Boundary {
    /// Builds a boundary from geocoder records, reducing them to the
    /// largest polygon part.
    ///
    /// # Errors
    ///
    /// Returns [`GeographyError::NotFound`] if no record carries a polygon.
    pub fn from_records(
        query: &str,
        records: Vec<BoundaryRecord>,
    ) -> Result<Self, GeographyError> {
        let parts: MultiPolygon<f64> = records
            .iter()
            .flat_map(|r| r.geometry.0.iter().cloned())
            .collect();

        let polygon = largest_polygon(&parts).ok_or_else(|| GeographyError::NotFound {
            query: query.to_string(),
        })?;

        log::debug!(
            "Reduced {} record(s) with {} part(s) to largest polygon (area {:.6})",
            records.len(),
            parts.0.len(),
            polygon.unsigned_area()
        );

        Ok(Self { records, polygon })
    }

    /// Centroid of the reduced polygon as `(latitude, longitude)`.
    ///
    /// Falls back to the mean of the records' reported coordinates when the
    /// polygon is degenerate.
    #[must_use]
    pub fn center(&self) -> Option<(f64, f64)> {
        if let Some(point) = self.polygon.centroid() {
            return Some((point.y(), point.x()));
        }
        if self.records.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.records.len() as f64;
        let lat = self.records.iter().map(|r| r.latitude).sum::<f64>() / n;
        let lon = self.records.iter().map(|r| r.longitude).sum::<f64>() / n;
        Some((lat, lon))
    }

    /// Every record's geometry simplified with the given tolerance, for the
    /// map overlay.
    #[must_use]
    pub fn simplified(&self, tolerance: f64) -> Vec<(String, MultiPolygon<f64>)> {
        self.records
            .iter()
            .map(|r| (r.name.clone(), r.geometry.simplify(tolerance)))
            .collect()
    }
}

/// Loads the boundary described by `config`: from the local file when
/// `geojson_path` is set, otherwise by geocoding `city` with Nominatim.
///
/// # Errors
///
/// Returns [`GeographyError`] if the file or request fails or no polygon
/// is found.
pub async fn load_boundary(config: &BoundaryConfig) -> Result<Boundary, GeographyError> {
    if let Some(path) = &config.geojson_path {
        log::info!("Loading boundary from {}", path.display());
        let records = geojson_file::read_records(path)?;
        return Boundary::from_records(&path.display().to_string(), records);
    }

    log::info!("Geocoding boundary for '{}'", config.city);
    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .build()?;
    let records = nominatim::search_boundary(&client, &config.nominatim_url, &config.city).await?;
    Boundary::from_records(&config.city, records)
}

/// Returns the part with the largest unsigned area.
#[must_use]
pub fn largest_polygon(parts: &MultiPolygon<f64>) -> Option<Polygon<f64>> {
    parts
        .0
        .iter()
        .max_by(|a, b| a.unsigned_area().total_cmp(&b.unsigned_area()))
        .cloned()
}

/// Converts a `GeoJSON` geometry value into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon`; anything else is `None`.
#[must_use]
pub fn geometry_to_multipolygon(geometry: &serde_json::Value) -> Option<MultiPolygon<f64>> {
    let geojson: GeoJson = geometry.to_string().parse().ok()?;
    if let GeoJson::Geometry(geom) = geojson {
        let geo_geom: geo::Geometry<f64> = geom.try_into().ok()?;
        match geo_geom {
            geo::Geometry::MultiPolygon(mp) => Some(mp),
            geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
            _ => None,
        }
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use geo::{LineString, polygon};

    use super::*;

    /// Axis-aligned rectangle with the given width and height.
    fn rect(x: f64, y: f64, w: f64, h: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![(x, y), (x + w, y), (x + w, y + h), (x, y + h), (x, y)]),
            vec![],
        )
    }

    fn record(name: &str, parts: Vec<Polygon<f64>>) -> BoundaryRecord {
        BoundaryRecord {
            name: name.to_string(),
            latitude: 38.7,
            longitude: -9.1,
            geometry: MultiPolygon(parts),
        }
    }

    #[test]
    fn picks_largest_part_of_multipolygon() {
        let small = rect(0.0, 0.0, 2.0, 5.0);
        let large = rect(10.0, 10.0, 5.0, 6.0);
        assert!((small.unsigned_area() - 10.0).abs() < 1e-9);
        assert!((large.unsigned_area() - 30.0).abs() < 1e-9);

        let boundary =
            Boundary::from_records("x", vec![record("x", vec![small, large.clone()])]).unwrap();
        assert_eq!(boundary.polygon, large);
        assert_eq!(boundary.records.len(), 1);
    }

    #[test]
    fn considers_parts_across_records() {
        let boundary = Boundary::from_records(
            "x",
            vec![
                record("a", vec![rect(0.0, 0.0, 1.0, 1.0)]),
                record("b", vec![rect(5.0, 5.0, 3.0, 3.0)]),
            ],
        )
        .unwrap();
        assert!((boundary.polygon.unsigned_area() - 9.0).abs() < 1e-9);
    }

    #[test]
    fn no_polygons_is_not_found() {
        let err = Boundary::from_records("Atlantis", vec![record("a", vec![])]).unwrap_err();
        assert!(matches!(err, GeographyError::NotFound { query } if query == "Atlantis"));
    }

    #[test]
    fn center_is_polygon_centroid() {
        let boundary =
            Boundary::from_records("x", vec![record("x", vec![rect(-10.0, 38.0, 2.0, 2.0)])])
                .unwrap();
        let (lat, lon) = boundary.center().unwrap();
        assert!((lat - 39.0).abs() < 1e-9);
        assert!((lon - -9.0).abs() < 1e-9);
    }

    #[test]
    fn simplification_drops_collinear_vertices() {
        let poly = polygon![
            (x: 0.0, y: 0.0),
            (x: 1.0, y: 0.0),
            (x: 2.0, y: 0.0),
            (x: 2.0, y: 2.0),
            (x: 0.0, y: 2.0),
            (x: 0.0, y: 0.0),
        ];
        let boundary = Boundary::from_records("x", vec![record("x", vec![poly])]).unwrap();
        let simplified = boundary.simplified(0.001);
        assert_eq!(simplified.len(), 1);
        let (name, geometry) = &simplified[0];
        assert_eq!(name, "x");
        assert!(geometry.0[0].exterior().0.len() < 6);
    }

    #[test]
    fn converts_polygon_and_multipolygon_geometries() {
        let poly = serde_json::json!({
            "type": "Polygon",
            "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]]
        });
        assert_eq!(geometry_to_multipolygon(&poly).unwrap().0.len(), 1);

        let multi = serde_json::json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]],
                [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 5.0]]]
            ]
        });
        assert_eq!(geometry_to_multipolygon(&multi).unwrap().0.len(), 2);

        let point = serde_json::json!({ "type": "Point", "coordinates": [0.0, 0.0] });
        assert!(geometry_to_multipolygon(&point).is_none());
    }
}
