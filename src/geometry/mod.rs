//! Geometry handling
//!
//! Decodes the textual geometries returned by the gazetteer, serializes
//! result geometries back to well-known text and reprojects coordinates
//! from WGS84 into the metric web-mercator reference used downstream.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::GeoparseError;

/// WGS84 geographic coordinates (x = longitude, y = latitude)
pub const CRS_WGS84: &str = "EPSG:4326";
/// Spherical web-mercator, metric
pub const CRS_WEB_MERCATOR: &str = "EPSG:3857";

/// Spherical earth radius used by the web-mercator projection, in meters
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// A single coordinate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub x: f64,
    pub y: f64,
}

/// An ordered line geometry; no points means degenerate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    pub points: Vec<GeoPoint>,
}

impl Polyline {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Serialize as well-known text
    pub fn to_wkt(&self) -> String {
        if self.points.is_empty() {
            return "LINESTRING EMPTY".to_string();
        }
        let coords: Vec<String> = self
            .points
            .iter()
            .map(|p| format!("{} {}", p.x, p.y))
            .collect();
        format!("LINESTRING ({})", coords.join(", "))
    }

    /// Reproject every point into web mercator
    pub fn to_web_mercator(&self) -> Polyline {
        Polyline {
            points: self.points.iter().map(web_mercator).collect(),
        }
    }
}

/// Outer ring of a boundary polygon
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRing {
    pub points: Vec<GeoPoint>,
}

impl PolygonRing {
    /// Reproject every vertex into web mercator
    pub fn to_web_mercator(&self) -> PolygonRing {
        PolygonRing {
            points: self.points.iter().map(web_mercator).collect(),
        }
    }
}

/// Decode a `LINESTRING(x y,x y)` geometry, degrading to empty on failure
///
/// A malformed geometry must not abort the resolution loop, so every
/// failure is logged together with the offending coordinate text and an
/// empty polyline is returned instead.
pub fn decode_linestring(text: &str) -> Polyline {
    // Strip the fixed "LINESTRING(" prefix and the closing parenthesis
    let inner = match text.get(11..text.len().saturating_sub(1)) {
        Some(inner) => inner,
        None => {
            warn!("Unusable line geometry text: '{}'", text);
            return Polyline::default();
        }
    };

    let mut points = Vec::new();
    for pair in inner.split(',') {
        match parse_coordinate_pair(pair) {
            Ok(point) => points.push(point),
            Err(e) => {
                warn!("Failed to decode line geometry: {}", e);
                warn!("Offending coordinate text: '{}'", pair);
                return Polyline::default();
            }
        }
    }
    Polyline { points }
}

/// Parse the outer ring of a `POLYGON ((...))` geometry
///
/// Strict counterpart of [`decode_linestring`]: the boundary polygon is
/// load-bearing, so failures surface as errors instead of empty geometry.
pub fn parse_polygon_ring(text: &str) -> Result<PolygonRing, GeoparseError> {
    let rest = text
        .trim()
        .strip_prefix("POLYGON")
        .ok_or_else(|| GeoparseError::parse("polygon geometry", text))?
        .trim_start();
    let inner = rest
        .strip_prefix("((")
        .and_then(|r| r.split(')').next())
        .ok_or_else(|| GeoparseError::parse("polygon geometry", text))?;

    let mut points = Vec::new();
    for pair in inner.split(',') {
        points.push(parse_coordinate_pair(pair.trim())?);
    }
    Ok(PolygonRing { points })
}

/// Split one `x y` coordinate token pair, tolerating stray parentheses
fn parse_coordinate_pair(pair: &str) -> Result<GeoPoint, GeoparseError> {
    let mut tokens = pair.split(' ');
    let x_raw = tokens.next().unwrap_or_default().replace(['(', ')'], "");
    let y_raw = tokens
        .next()
        .ok_or_else(|| GeoparseError::parse("coordinate pair", pair))?
        .replace(['(', ')'], "");

    let x = x_raw
        .parse()
        .map_err(|_| GeoparseError::parse("x coordinate", pair))?;
    let y = y_raw
        .parse()
        .map_err(|_| GeoparseError::parse("y coordinate", pair))?;
    Ok(GeoPoint { x, y })
}

/// Forward web-mercator projection of a WGS84 point
pub fn web_mercator(point: &GeoPoint) -> GeoPoint {
    let x = EARTH_RADIUS_M * point.x.to_radians();
    let y = EARTH_RADIUS_M
        * (std::f64::consts::FRAC_PI_4 + point.y.to_radians() / 2.0)
            .tan()
            .ln();
    GeoPoint { x, y }
}
