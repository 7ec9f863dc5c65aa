//! Nominatim / `OpenStreetMap` boundary search.
//!
//! Looks up a place by free-form name and asks Nominatim to include the
//! place outline as `GeoJSON`. The public instance allows at most one
//! request per second; boundary lookups happen once per session so no
//! rate limiting is applied here.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use crate::{BoundaryRecord, GeographyError, geometry_to_multipolygon};

/// Searches Nominatim for `query` and returns every result that carries a
/// polygon outline.
///
/// # Errors
///
/// Returns [`GeographyError`] if the HTTP request fails or the response
/// cannot be parsed.
pub async fn search_boundary(
    client: &reqwest::Client,
    base_url: &str,
    query: &str,
) -> Result<Vec<BoundaryRecord>, GeographyError> {
    let resp = client
        .get(base_url)
        .query(&[
            ("q", query),
            ("format", "jsonv2"),
            ("polygon_geojson", "1"),
            ("limit", "1"),
        ])
        .send()
        .await?
        .error_for_status()?;

    let body: serde_json::Value = resp.json().await?;
    parse_response(&body)
}

/// Parses a Nominatim `jsonv2` search response.
fn parse_response(body: &serde_json::Value) -> Result<Vec<BoundaryRecord>, GeographyError> {
    let results = body.as_array().ok_or_else(|| GeographyError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let mut records = Vec::new();

    for result in results {
        let coord = |key: &str| {
            result[key]
                .as_str()
                .and_then(|s| s.parse::<f64>().ok())
                .ok_or_else(|| GeographyError::Parse {
                    message: format!("Missing {key} in Nominatim response"),
                })
        };
        let latitude = coord("lat")?;
        let longitude = coord("lon")?;

        let name = result["display_name"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        let Some(geometry) = result.get("geojson").and_then(geometry_to_multipolygon) else {
            log::warn!("Nominatim result '{name}' has no polygon outline, skipping");
            continue;
        };

        records.push(BoundaryRecord {
            name,
            latitude,
            longitude,
            geometry,
        });
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_polygon_result() {
        let body = serde_json::json!([{
            "lat": "38.7077507",
            "lon": "-9.1365919",
            "display_name": "Lisboa, Portugal",
            "geojson": {
                "type": "MultiPolygon",
                "coordinates": [
                    [[[-9.23, 38.69], [-9.09, 38.69], [-9.09, 38.80], [-9.23, 38.80], [-9.23, 38.69]]],
                    [[[-9.10, 38.60], [-9.09, 38.60], [-9.09, 38.61], [-9.10, 38.60]]]
                ]
            }
        }]);
        let records = parse_response(&body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Lisboa, Portugal");
        assert!((records[0].latitude - 38.707_750_7).abs() < 1e-6);
        assert_eq!(records[0].geometry.0.len(), 2);
    }

    #[test]
    fn skips_results_without_polygon() {
        let body = serde_json::json!([{
            "lat": "38.7",
            "lon": "-9.1",
            "display_name": "Somewhere",
            "geojson": { "type": "Point", "coordinates": [-9.1, 38.7] }
        }]);
        assert!(parse_response(&body).unwrap().is_empty());
    }

    #[test]
    fn parses_empty_result() {
        let body = serde_json::json!([]);
        assert!(parse_response(&body).unwrap().is_empty());
    }

    #[test]
    fn rejects_non_array_body() {
        let body = serde_json::json!({ "error": "bad request" });
        assert!(matches!(
            parse_response(&body),
            Err(GeographyError::Parse { .. })
        ));
    }
}
