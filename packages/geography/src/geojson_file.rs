//! Boundary records from a local `GeoJSON` file.
//!
//! Accepts a `FeatureCollection`, a single `Feature`, or a bare geometry.
//! Useful offline or when the geocoder's outline needs to be pinned.

use std::path::Path;

use geo::Centroid;

use crate::{BoundaryRecord, GeographyError, geometry_to_multipolygon};

/// Reads every polygon feature in the file at `path`.
///
/// # Errors
///
/// Returns [`GeographyError`] if the file cannot be read or is not valid
/// JSON.
pub fn read_records(path: &Path) -> Result<Vec<BoundaryRecord>, GeographyError> {
    let contents = std::fs::read_to_string(path).map_err(|source| GeographyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let fallback_name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_records(&contents, &fallback_name)
}

/// Parses boundary records from `GeoJSON` text.
///
/// # Errors
///
/// Returns [`GeographyError::Parse`] if the text is not valid JSON.
pub fn parse_records(
    contents: &str,
    fallback_name: &str,
) -> Result<Vec<BoundaryRecord>, GeographyError> {
    let json: serde_json::Value =
        serde_json::from_str(contents).map_err(|e| GeographyError::Parse {
            message: format!("Failed to parse boundary GeoJSON: {e}"),
        })?;

    let features: Vec<&serde_json::Value> = match json["type"].as_str() {
        Some("FeatureCollection") => json["features"]
            .as_array()
            .map(|f| f.iter().collect())
            .unwrap_or_default(),
        Some("Feature") => vec![&json],
        _ => {
            return Ok(geometry_to_record(&json, fallback_name)
                .into_iter()
                .collect());
        }
    };

    Ok(features
        .into_iter()
        .filter_map(|feature| {
            let props = &feature["properties"];
            let name = props["name"]
                .as_str()
                .or_else(|| props["display_name"].as_str())
                .unwrap_or(fallback_name);
            geometry_to_record(&feature["geometry"], name)
        })
        .collect())
}

fn geometry_to_record(geometry: &serde_json::Value, name: &str) -> Option<BoundaryRecord> {
    let geometry = geometry_to_multipolygon(geometry)?;
    let centroid = geometry.centroid()?;
    Some(BoundaryRecord {
        name: name.to_string(),
        latitude: centroid.y(),
        longitude: centroid.x(),
        geometry,
    })
}
