#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Map view of a filtered set of accidents.
//!
//! Builds everything a web map needs to draw the dashboard's map panel:
//! one circle marker per accident with its popup, radius clusters computed
//! with an R-tree for dense areas, the simplified city boundary as an
//! overlay, and the initial center and zoom.

use accident_map_accident_models::Accident;
use accident_map_config::MapConfig;
use accident_map_geography::Boundary;
use geo::{Centroid, MultiPoint, Point};
use geojson::{Feature, FeatureCollection, Geometry, JsonObject};
use rstar::{AABB, PointDistance, RTree, RTreeObject};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// Errors that can occur while building a map view.
#[derive(Debug, Error)]
pub enum SpatialError {
    /// There are no accidents and the boundary has no usable centroid.
    #[error("Cannot determine a map center: no accidents and no boundary centroid")]
    NoCenter,
}

/// Map center in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapCenter {
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

/// A group of nearby markers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerCluster {
    /// Centroid of the grouped markers.
    pub center: MapCenter,
    /// Number of accidents in the cluster.
    pub count: usize,
    /// Ids of the grouped accidents.
    pub accident_ids: Vec<String>,
}

/// Everything the map panel draws.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapView {
    /// Initial center.
    pub center: MapCenter,
    /// Initial zoom level.
    pub zoom: u8,
    /// Base tile layer.
    pub tiles: String,
    /// One point feature per accident.
    pub markers: FeatureCollection,
    /// Radius clusters over the markers.
    pub clusters: Vec<MarkerCluster>,
    /// Simplified boundary polygons.
    pub boundary: FeatureCollection,
}

/// Builds the map view for `accidents` over `boundary`.
///
/// The map is centered on the mean accident position, or on the boundary
/// centroid when no accident is left after filtering.
///
/// # Errors
///
/// Returns [`SpatialError::NoCenter`] if there are no accidents and the
/// boundary has no centroid.
pub fn build_map_view(
    accidents: &[&Accident],
    boundary: &Boundary,
    config: &MapConfig,
    simplify_tolerance: f64,
) -> Result<MapView, SpatialError> {
    let center = map_center(accidents, boundary).ok_or(SpatialError::NoCenter)?;

    let markers = FeatureCollection {
        bbox: None,
        features: accidents.iter().map(|a| marker(a, config)).collect(),
        foreign_members: None,
    };

    let clusters = cluster_markers(accidents, config.cluster_radius);
    let overlay = boundary_overlay(boundary, config, simplify_tolerance);

    log::debug!(
        "Map view: {} marker(s), {} cluster(s), {} boundary feature(s)",
        markers.features.len(),
        clusters.len(),
        overlay.features.len()
    );

    Ok(MapView {
        center,
        zoom: config.zoom,
        tiles: config.tiles.clone(),
        markers,
        clusters,
        boundary: overlay,
    })
}

/// Mean accident coordinate, falling back to the boundary center.
#[must_use]
pub fn map_center(accidents: &[&Accident], boundary: &Boundary) -> Option<MapCenter> {
    if accidents.is_empty() {
        return boundary
            .center()
            .map(|(latitude, longitude)| MapCenter {
                latitude,
                longitude,
            });
    }

    #[allow(clippy::cast_precision_loss)]
    let n = accidents.len() as f64;
    Some(MapCenter {
        latitude: accidents.iter().map(|a| a.latitude).sum::<f64>() / n,
        longitude: accidents.iter().map(|a| a.longitude).sum::<f64>() / n,
    })
}

fn marker(accident: &Accident, config: &MapConfig) -> Feature {
    let mut properties = JsonObject::new();
    properties.insert("id".to_string(), json!(accident.id));
    properties.insert("date".to_string(), json!(accident.date_str));
    properties.insert("weekday".to_string(), json!(accident.weekday));
    properties.insert("hour".to_string(), json!(accident.hour));
    properties.insert(
        "minorInjuries".to_string(),
        json!(accident.minor_injuries_30d),
    );
    properties.insert(
        "seriousInjuries".to_string(),
        json!(accident.serious_injuries_30d),
    );
    properties.insert("fatalities".to_string(), json!(accident.fatalities_30d));
    properties.insert("popup".to_string(), json!(popup_html(accident)));
    properties.insert(
        "style".to_string(),
        json!({
            "radius": config.marker_radius,
            "color": config.marker_color,
            "fill": true,
            "fillOpacity": config.marker_fill_opacity,
        }),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(geojson::Value::Point(vec![
            accident.longitude,
            accident.latitude,
        ]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Popup body for one accident marker.
#[must_use]
pub fn popup_html(accident: &Accident) -> String {
    let count = |c: Option<u32>| c.map_or_else(|| "-".to_string(), |n| n.to_string());
    format!(
        "ID: {}<br>Date: {}<br>Weekday: {}<br>Hour: {}<br>Minor injuries: {}<br>Serious injuries: {}<br>Fatalities: {}",
        escape_html(&accident.id),
        accident.date_str.as_deref().unwrap_or("-"),
        accident
            .weekday
            .map_or_else(|| "-".to_string(), |w| w.to_string()),
        accident
            .hour
            .map_or_else(|| "-".to_string(), |h| h.to_string()),
        count(accident.minor_injuries_30d),
        count(accident.serious_injuries_30d),
        count(accident.fatalities_30d),
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn boundary_overlay(boundary: &Boundary, config: &MapConfig, tolerance: f64) -> FeatureCollection {
    let features = boundary
        .simplified(tolerance)
        .into_iter()
        .map(|(name, geometry)| {
            let mut properties = JsonObject::new();
            properties.insert("name".to_string(), json!(name));
            properties.insert(
                "style".to_string(),
                json!({ "fillColor": config.boundary_fill }),
            );
            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(&geometry))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

/// A marker position stored in the R-tree.
struct MarkerEntry {
    index: usize,
    position: [f64; 2],
}

impl RTreeObject for MarkerEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for MarkerEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx.mul_add(dx, dy * dy)
    }
}

/// Groups markers greedily: each not-yet-clustered accident, in input
/// order, claims every unclaimed accident within `radius` degrees of it.
///
/// A non-positive radius puts every accident in its own cluster.
#[must_use]
pub fn cluster_markers(accidents: &[&Accident], radius: f64) -> Vec<MarkerCluster> {
    let tree = RTree::bulk_load(
        accidents
            .iter()
            .enumerate()
            .map(|(index, a)| MarkerEntry {
                index,
                position: [a.longitude, a.latitude],
            })
            .collect(),
    );

    let radius_2 = radius.max(0.0).powi(2);
    let mut claimed = vec![false; accidents.len()];
    let mut clusters = Vec::new();

    for (index, accident) in accidents.iter().enumerate() {
        if claimed[index] {
            continue;
        }

        let mut members: Vec<usize> = tree
            .locate_within_distance([accident.longitude, accident.latitude], radius_2)
            .map(|entry| entry.index)
            .filter(|&i| !claimed[i])
            .collect();
        if !members.contains(&index) {
            members.push(index);
        }
        members.sort_unstable();

        for &i in &members {
            claimed[i] = true;
        }

        let points: MultiPoint<f64> = members
            .iter()
            .map(|&i| Point::new(accidents[i].longitude, accidents[i].latitude))
            .collect();
        let Some(centroid) = points.centroid() else {
            continue;
        };

        clusters.push(MarkerCluster {
            center: MapCenter {
                latitude: centroid.y(),
                longitude: centroid.x(),
            },
            count: members.len(),
            accident_ids: members.iter().map(|&i| accidents[i].id.clone()).collect(),
        });
    }

    clusters
}
