//! Gazetteer access
//!
//! The resolver talks to the gazetteer through a narrow trait so tests can
//! substitute stubs for the SQLite store.

pub mod store;

pub use store::SqliteGazetteer;

use crate::error::GeoparseError;
use crate::geometry::PolygonRing;

/// One location row matched against a candidate string
#[derive(Debug, Clone)]
pub struct GazetteerRow {
    /// Matched location name
    pub name: String,
    /// Line geometry as well-known text, WGS84
    pub geometry: String,
}

/// Fuzzy place-name lookup plus the regional boundary table
pub trait Gazetteer {
    /// Approximate-match a candidate string against location names
    ///
    /// `None` signals a failed query and makes the caller retry. A `Some`
    /// carrying an empty vector is a successful lookup without matches and
    /// must not be retried.
    fn fuzzy_match(&mut self, candidate: &str) -> Option<Vec<GazetteerRow>>;

    /// Load the outer rings of every boundary polygon row
    fn boundary_polygon(&mut self) -> Result<Vec<PolygonRing>, GeoparseError>;
}
