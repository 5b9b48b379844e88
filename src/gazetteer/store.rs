//! SQLite gazetteer store
//!
//! Backs the gazetteer trait with a SQLite database and a registered
//! `levenshtein` scalar function, so approximate name matching runs inside
//! the query instead of pulling every row across.

use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection};
use tracing::{debug, warn};

use crate::config::GazetteerConfig;
use crate::error::GeoparseError;
use crate::gazetteer::{Gazetteer, GazetteerRow};
use crate::geometry::{parse_polygon_ring, PolygonRing};

/// Gazetteer backed by a SQLite database
pub struct SqliteGazetteer {
    conn: Connection,
    config: GazetteerConfig,
}

impl SqliteGazetteer {
    /// Open the database configured in `config.db_path`
    pub fn open(config: GazetteerConfig) -> Result<Self, GeoparseError> {
        let conn = Connection::open(&config.db_path)?;
        Self::with_connection(conn, config)
    }

    /// Open an in-memory database (for testing)
    pub fn in_memory(config: GazetteerConfig) -> Result<Self, GeoparseError> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, config)
    }

    fn with_connection(conn: Connection, config: GazetteerConfig) -> Result<Self, GeoparseError> {
        register_levenshtein(&conn)?;
        Ok(Self { conn, config })
    }

    /// Borrow the underlying connection (for fixtures)
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn query_names(&self, candidate: &str) -> Result<Vec<GazetteerRow>, GeoparseError> {
        let sql = format!(
            "SELECT {name}, {geom} FROM {table} \
             WHERE levenshtein(lower({name}), lower(?1)) <= ?2",
            name = self.config.name_column,
            geom = self.config.geometry_column,
            table = self.config.locations_table,
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![candidate, self.config.max_edit_distance], |row| {
                Ok(GazetteerRow {
                    name: row.get(0)?,
                    geometry: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl Gazetteer for SqliteGazetteer {
    fn fuzzy_match(&mut self, candidate: &str) -> Option<Vec<GazetteerRow>> {
        match self.query_names(candidate) {
            Ok(rows) => {
                debug!("Gazetteer returned {} rows for '{}'", rows.len(), candidate);
                Some(rows)
            }
            Err(e) => {
                warn!("Gazetteer query failed for '{}': {}", candidate, e);
                None
            }
        }
    }

    fn boundary_polygon(&mut self) -> Result<Vec<PolygonRing>, GeoparseError> {
        let sql = format!(
            "SELECT {geom} FROM {table}",
            geom = self.config.boundary_geometry_column,
            table = self.config.boundary_table,
        );
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| GeoparseError::BoundaryLoadFailure(e.to_string()))?;
        let texts = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<Result<Vec<String>, _>>())
            .map_err(|e| GeoparseError::BoundaryLoadFailure(e.to_string()))?;

        texts
            .iter()
            .map(|text| {
                parse_polygon_ring(text)
                    .map_err(|e| GeoparseError::BoundaryLoadFailure(e.to_string()))
            })
            .collect()
    }
}

/// Register `levenshtein(a, b)` as a deterministic SQL function
fn register_levenshtein(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.create_scalar_function(
        "levenshtein",
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let a: String = ctx.get(0)?;
            let b: String = ctx.get(1)?;
            Ok(strsim::levenshtein(&a, &b) as i64)
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> GazetteerConfig {
        GazetteerConfig::default()
    }

    fn seeded_store() -> SqliteGazetteer {
        let store = SqliteGazetteer::in_memory(test_config()).unwrap();
        store
            .connection()
            .execute_batch(
                "CREATE TABLE locations (name TEXT NOT NULL, geometry TEXT NOT NULL);
                 INSERT INTO locations VALUES
                     ('gare cornavin', 'LINESTRING(6.1419 46.2104,6.1423 46.2108)'),
                     ('rue du mont-blanc', 'LINESTRING(6.1440 46.2070,6.1445 46.2090)');
                 CREATE TABLE geneva_poly (st_polygonize TEXT NOT NULL);
                 INSERT INTO geneva_poly VALUES
                     ('POLYGON((6.1 46.1,6.3 46.1,6.3 46.3,6.1 46.1))');",
            )
            .unwrap();
        store
    }

    #[test]
    fn test_levenshtein_function_is_registered() {
        let store = SqliteGazetteer::in_memory(test_config()).unwrap();
        let distance: i64 = store
            .connection()
            .query_row("SELECT levenshtein('kitten', 'sitting')", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(distance, 3);
    }

    #[test]
    fn test_exact_name_matches() {
        let mut store = seeded_store();
        let rows = store.fuzzy_match("gare cornavin").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "gare cornavin");
        assert!(rows[0].geometry.starts_with("LINESTRING"));
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let mut store = seeded_store();
        let rows = store.fuzzy_match("Gare Cornavin").unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_near_name_within_edit_distance_matches() {
        let mut store = seeded_store();
        // One substitution and one deletion away
        let rows = store.fuzzy_match("gare cornavim").unwrap();
        assert_eq!(rows.len(), 1);
        let rows = store.fuzzy_match("gare cornavi").unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_distant_name_returns_empty_not_none() {
        let mut store = seeded_store();
        let rows = store.fuzzy_match("completely different text");
        assert_eq!(rows.unwrap().len(), 0);
    }

    #[test]
    fn test_missing_table_reports_failed_query() {
        let mut store = SqliteGazetteer::in_memory(test_config()).unwrap();
        assert!(store.fuzzy_match("anything").is_none());
    }

    #[test]
    fn test_boundary_polygon_loads_and_parses() {
        let mut store = seeded_store();
        let rings = store.boundary_polygon().unwrap();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].points.len(), 4);
    }

    #[test]
    fn test_boundary_polygon_missing_table_is_load_failure() {
        let mut store = SqliteGazetteer::in_memory(test_config()).unwrap();
        let err = store.boundary_polygon().unwrap_err();
        assert!(matches!(err, GeoparseError::BoundaryLoadFailure(_)));
    }

    #[test]
    fn test_boundary_polygon_malformed_geometry_is_load_failure() {
        let mut store = SqliteGazetteer::in_memory(test_config()).unwrap();
        store
            .connection()
            .execute_batch(
                "CREATE TABLE geneva_poly (st_polygonize TEXT NOT NULL);
                 INSERT INTO geneva_poly VALUES ('not a polygon');",
            )
            .unwrap();
        let err = store.boundary_polygon().unwrap_err();
        assert!(matches!(err, GeoparseError::BoundaryLoadFailure(_)));
    }
}
