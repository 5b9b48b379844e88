//! Location resolution
//!
//! Walks every frame's candidate strings in order, queries the gazetteer
//! with a bounded retry, memoizes outcomes per candidate value and builds
//! the final geo-referenced table. Only a failing boundary-polygon load is
//! fatal; everything else degrades to fewer output rows.

pub mod cache;

use tracing::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::error::GeoparseError;
use crate::gazetteer::{Gazetteer, GazetteerRow};
use crate::geometry::{decode_linestring, Polyline};
use crate::ocr::FrameMap;
use crate::report::ResultTable;
use cache::{Outcome, ResolutionCache};

/// One gazetteer match attributed to a frame
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMatch {
    /// Frame whose candidate string produced the match
    pub frame_nr: String,
    /// Matched gazetteer name
    pub location_name: String,
    /// Decoded line geometry, WGS84
    pub geo: Polyline,
}

/// Maps candidate strings to gazetteer matches
///
/// Owns the gazetteer connection and the resolution cache for the duration
/// of one run; both are released when the resolver is dropped, on every
/// exit path.
pub struct Resolver<G: Gazetteer> {
    gazetteer: G,
    cache: ResolutionCache,
    config: ResolverConfig,
}

impl<G: Gazetteer> Resolver<G> {
    pub fn new(gazetteer: G, config: ResolverConfig) -> Self {
        Self {
            gazetteer,
            cache: ResolutionCache::new(),
            config,
        }
    }

    /// Resolve every candidate string and assemble the reprojected table
    ///
    /// Returns an empty table when nothing matched (no boundary load, no
    /// artifacts for the caller to write). A non-empty result has passed
    /// the boundary-polygon load, been reprojected to web mercator and had
    /// exact duplicates removed.
    pub fn resolve_frames(&mut self, frames: &FrameMap) -> Result<ResultTable, GeoparseError> {
        let mut row_storage: Vec<ResolvedMatch> = Vec::new();
        let mut found = 0usize;

        for (frame_nr, group) in frames {
            for candidate in &group.strings {
                // Re-encounters replay the first resolution, including its
                // frame number; a cached NoMatch stays silent.
                if let Some(outcome) = self.cache.get(candidate) {
                    if let Outcome::Matched(cached) = outcome {
                        found += cached.len();
                        row_storage.extend(cached.iter().cloned());
                    }
                    continue;
                }

                let Some(gazetteer_rows) = self.query_with_retry(candidate) else {
                    // Exhausted candidates stay uncached so a later
                    // encounter gets fresh attempts
                    continue;
                };
                if gazetteer_rows.is_empty() {
                    self.cache.insert(candidate.clone(), Outcome::NoMatch);
                    continue;
                }

                let matches: Vec<ResolvedMatch> = gazetteer_rows
                    .into_iter()
                    .map(|row| ResolvedMatch {
                        frame_nr: frame_nr.clone(),
                        location_name: row.name,
                        geo: decode_linestring(&row.geometry),
                    })
                    .collect();
                found += matches.len();
                row_storage.extend(matches.iter().cloned());
                self.cache.insert(candidate.clone(), Outcome::Matched(matches));
            }
        }

        if row_storage.is_empty() {
            info!("Geoparsing did not find any matches");
            return Ok(ResultTable::empty());
        }
        info!(
            "Found {} geolocations ({} candidates queried, cache hit rate {:.0}%)",
            found,
            self.cache.len(),
            self.cache.hit_rate() * 100.0
        );

        let boundary = self.gazetteer.boundary_polygon()?;
        let boundary: Vec<_> = boundary.iter().map(|ring| ring.to_web_mercator()).collect();
        info!(
            "Loaded regional boundary polygon ({} rings, reprojected)",
            boundary.len()
        );

        let mut table = ResultTable::from_matches(row_storage).to_web_mercator();
        table.drop_exact_duplicates();
        info!(
            "Result table holds {} rows, {} unique location names",
            table.len(),
            table.distinct_location_names()
        );
        Ok(table)
    }

    /// Query the gazetteer, retrying while it fails to answer
    ///
    /// A `Some` response ends the loop even when it carries zero rows.
    fn query_with_retry(&mut self, candidate: &str) -> Option<Vec<GazetteerRow>> {
        for attempt in 1..=self.config.max_query_attempts {
            if let Some(rows) = self.gazetteer.fuzzy_match(candidate) {
                debug!(
                    "'{}' answered on attempt {} with {} rows",
                    candidate,
                    attempt,
                    rows.len()
                );
                return Some(rows);
            }
        }
        warn!(
            "{}",
            GeoparseError::TransientQueryFailure {
                candidate: candidate.to_string(),
                attempts: self.config.max_query_attempts,
            }
        );
        None
    }

    /// Inspect the cache (statistics, tests)
    pub fn cache(&self) -> &ResolutionCache {
        &self.cache
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{GeoPoint, PolygonRing, CRS_WEB_MERCATOR};
    use crate::ocr::FrameTokenGroup;
    use std::collections::HashMap;

    /// Scripted gazetteer double counting its calls
    struct StubGazetteer {
        /// Exact candidate -> matched rows; anything else answers empty
        matches: HashMap<String, Vec<GazetteerRow>>,
        /// Number of leading calls answered with `None`
        failures: usize,
        calls: u32,
        boundary_ok: bool,
    }

    impl StubGazetteer {
        fn new(matches: &[(&str, &[(&str, &str)])]) -> Self {
            let matches = matches
                .iter()
                .map(|(candidate, rows)| {
                    (
                        candidate.to_string(),
                        rows.iter()
                            .map(|(name, geometry)| GazetteerRow {
                                name: name.to_string(),
                                geometry: geometry.to_string(),
                            })
                            .collect(),
                    )
                })
                .collect();
            Self {
                matches,
                failures: 0,
                calls: 0,
                boundary_ok: true,
            }
        }
    }

    impl Gazetteer for StubGazetteer {
        fn fuzzy_match(&mut self, candidate: &str) -> Option<Vec<GazetteerRow>> {
            self.calls += 1;
            if self.failures > 0 {
                self.failures -= 1;
                return None;
            }
            Some(self.matches.get(candidate).cloned().unwrap_or_default())
        }

        fn boundary_polygon(&mut self) -> Result<Vec<PolygonRing>, GeoparseError> {
            if self.boundary_ok {
                Ok(vec![PolygonRing {
                    points: vec![
                        GeoPoint { x: 6.1, y: 46.1 },
                        GeoPoint { x: 6.3, y: 46.1 },
                        GeoPoint { x: 6.3, y: 46.3 },
                        GeoPoint { x: 6.1, y: 46.1 },
                    ],
                }])
            } else {
                Err(GeoparseError::BoundaryLoadFailure(
                    "boundary table missing".to_string(),
                ))
            }
        }
    }

    fn frames_with(candidates: &[(&str, &[&str])]) -> FrameMap {
        let mut frames = FrameMap::new();
        for (frame_nr, strings) in candidates {
            frames.insert(
                frame_nr.to_string(),
                FrameTokenGroup {
                    strings: strings.iter().map(|s| s.to_string()).collect(),
                    boxes: Vec::new(),
                },
            );
        }
        frames
    }

    const CORNAVIN: (&str, &[(&str, &str)]) = (
        "gare cornavin",
        &[("gare cornavin", "LINESTRING(6.14 46.21,6.15 46.21)")],
    );

    fn resolver(stub: StubGazetteer) -> Resolver<StubGazetteer> {
        Resolver::new(stub, ResolverConfig::default())
    }

    #[test]
    fn test_repeated_candidate_queries_once_and_replays() {
        let frames = frames_with(&[("12", &["gare cornavin"]), ("31", &["gare cornavin"])]);
        let mut resolver = resolver(StubGazetteer::new(&[CORNAVIN]));

        let table = resolver.resolve_frames(&frames).unwrap();

        assert_eq!(resolver.gazetteer.calls, 1);
        // Replay repeats the first resolution, so the duplicate-drop
        // collapses both rows into the first frame's row
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].frame_nr, "12");
        assert_eq!(resolver.cache().hits(), 1);
    }

    #[test]
    fn test_zero_row_outcome_is_cached_as_no_match() {
        let frames = frames_with(&[("1", &["nowhere special", "nowhere special"])]);
        let mut resolver = resolver(StubGazetteer::new(&[]));

        let table = resolver.resolve_frames(&frames).unwrap();

        assert!(table.is_empty());
        assert_eq!(resolver.gazetteer.calls, 1);
        assert!(matches!(
            resolver.cache().peek("nowhere special"),
            Some(Outcome::NoMatch)
        ));
    }

    #[test]
    fn test_retry_until_the_fourth_attempt_succeeds() {
        let frames = frames_with(&[("1", &["gare cornavin"])]);
        let mut stub = StubGazetteer::new(&[CORNAVIN]);
        stub.failures = 3;
        let mut resolver = resolver(stub);

        let table = resolver.resolve_frames(&frames).unwrap();

        assert_eq!(resolver.gazetteer.calls, 4);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_retried_empty_success_counts_nothing() {
        let frames = frames_with(&[("1", &["nowhere special"])]);
        let mut stub = StubGazetteer::new(&[]);
        stub.failures = 3;
        let mut resolver = resolver(stub);

        let table = resolver.resolve_frames(&frames).unwrap();

        assert_eq!(resolver.gazetteer.calls, 4);
        assert!(table.is_empty());
    }

    #[test]
    fn test_exhausted_retries_abandon_and_leave_uncached() {
        let frames = frames_with(&[("1", &["gare cornavin", "gare cornavin"])]);
        let mut stub = StubGazetteer::new(&[CORNAVIN]);
        stub.failures = usize::MAX;
        let mut resolver = resolver(stub);

        let table = resolver.resolve_frames(&frames).unwrap();

        assert!(table.is_empty());
        // Four attempts per encounter; nothing cached in between
        assert_eq!(resolver.gazetteer.calls, 8);
        assert!(resolver.cache().is_empty());
    }

    #[test]
    fn test_multi_row_match_keeps_each_rows_own_fields() {
        let frames = frames_with(&[("1", &["rue de lausanne"])]);
        let mut resolver = resolver(StubGazetteer::new(&[(
            "rue de lausanne",
            &[
                ("rue de lausanne", "LINESTRING(6.14 46.21,6.15 46.22)"),
                ("route de lausanne", "LINESTRING(6.15 46.23,6.15 46.25)"),
            ],
        )]));

        let table = resolver.resolve_frames(&frames).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].location_name, "rue de lausanne");
        assert_eq!(table.rows[1].location_name, "route de lausanne");
        assert_ne!(table.rows[0].geo, table.rows[1].geo);
    }

    #[test]
    fn test_result_table_is_reprojected() {
        let frames = frames_with(&[("12", &["gare cornavin"])]);
        let mut resolver = resolver(StubGazetteer::new(&[CORNAVIN]));

        let table = resolver.resolve_frames(&frames).unwrap();

        assert_eq!(table.crs, CRS_WEB_MERCATOR);
        assert!(table.rows[0].geo.points[0].x > 600_000.0);
        assert!(table.rows[0].geo.points[0].y > 5_000_000.0);
    }

    #[test]
    fn test_malformed_geometry_degrades_to_empty_row() {
        let frames = frames_with(&[("1", &["quai des bergues"])]);
        let mut resolver = resolver(StubGazetteer::new(&[(
            "quai des bergues",
            &[("quai des bergues", "LINESTRING(6.14)")],
        )]));

        let table = resolver.resolve_frames(&frames).unwrap();

        // The match still lands in the table; its geometry is degenerate
        assert_eq!(table.len(), 1);
        assert!(table.rows[0].geo.is_empty());
    }

    #[test]
    fn test_boundary_load_failure_is_fatal() {
        let frames = frames_with(&[("1", &["gare cornavin"])]);
        let mut stub = StubGazetteer::new(&[CORNAVIN]);
        stub.boundary_ok = false;
        let mut resolver = resolver(stub);

        let err = resolver.resolve_frames(&frames).unwrap_err();

        assert!(matches!(err, GeoparseError::BoundaryLoadFailure(_)));
    }

    #[test]
    fn test_no_matches_skip_the_boundary_load() {
        let frames = frames_with(&[("1", &["nowhere special"])]);
        let mut stub = StubGazetteer::new(&[]);
        stub.boundary_ok = false;
        let mut resolver = resolver(stub);

        // The failing boundary is never touched on the empty path
        let table = resolver.resolve_frames(&frames).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_candidates_resolve_in_frame_then_list_order() {
        let frames = frames_with(&[
            ("09", &["place du molard"]),
            ("12", &["gare cornavin"]),
        ]);
        let mut resolver = resolver(StubGazetteer::new(&[
            CORNAVIN,
            (
                "place du molard",
                &[("place du molard", "LINESTRING(6.15 46.20,6.15 46.21)")],
            ),
        ]));

        let table = resolver.resolve_frames(&frames).unwrap();

        // Ascending frame order from the BTreeMap carries into the table
        assert_eq!(table.rows[0].frame_nr, "09");
        assert_eq!(table.rows[1].frame_nr, "12");
    }
}
