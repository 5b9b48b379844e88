//! Result table and output artifacts
//!
//! Collects resolved matches into the final frame/location/geometry table,
//! removes exact duplicates and persists the timestamped CSV and JSON
//! snapshot.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::GeoparseError;
use crate::geometry::{Polyline, CRS_WEB_MERCATOR, CRS_WGS84};
use crate::resolve::ResolvedMatch;

/// One row of the output table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub frame_nr: String,
    pub location_name: String,
    pub geo: Polyline,
}

/// The geo-referenced result table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultTable {
    /// Coordinate reference of every geometry in `rows`
    pub crs: String,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    /// Table with no rows, in the gazetteer's source reference
    pub fn empty() -> Self {
        Self {
            crs: CRS_WGS84.to_string(),
            rows: Vec::new(),
        }
    }

    /// Build a WGS84 table from accumulated matches
    pub fn from_matches(matches: Vec<ResolvedMatch>) -> Self {
        let rows = matches
            .into_iter()
            .map(|m| ResultRow {
                frame_nr: m.frame_nr,
                location_name: m.location_name,
                geo: m.geo,
            })
            .collect();
        Self {
            crs: CRS_WGS84.to_string(),
            rows,
        }
    }

    /// Reproject every geometry into the metric web-mercator reference
    pub fn to_web_mercator(&self) -> Self {
        Self {
            crs: CRS_WEB_MERCATOR.to_string(),
            rows: self
                .rows
                .iter()
                .map(|row| ResultRow {
                    frame_nr: row.frame_nr.clone(),
                    location_name: row.location_name.clone(),
                    geo: row.geo.to_web_mercator(),
                })
                .collect(),
        }
    }

    /// Remove rows equal on all fields, keeping the first occurrence
    pub fn drop_exact_duplicates(&mut self) {
        let mut seen: Vec<ResultRow> = Vec::new();
        self.rows.retain(|row| {
            if seen.contains(row) {
                false
            } else {
                seen.push(row.clone());
                true
            }
        });
    }

    /// Number of distinct location names across all rows
    pub fn distinct_location_names(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.location_name.as_str())
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Locations of the written artifacts
#[derive(Debug)]
pub struct ArtifactPaths {
    pub csv: PathBuf,
    pub snapshot: PathBuf,
}

/// Persist the table as a semicolon-delimited CSV and a JSON snapshot
///
/// Both filenames carry the run timestamp; the snapshot also carries the
/// video name so runs over different videos stay distinguishable.
pub fn write_artifacts(
    table: &ResultTable,
    output_dir: &Path,
    video_name: &str,
) -> Result<ArtifactPaths, GeoparseError> {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let csv_path = output_dir.join(format!("{}_geolocations.csv", timestamp));
    let snapshot_path = output_dir.join(format!("{}_{}_snapshot.json", timestamp, video_name));

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(&csv_path)?;
    writer.write_record(["frame_nr", "location_name", "geo"])?;
    for row in &table.rows {
        writer.write_record([
            row.frame_nr.as_str(),
            row.location_name.as_str(),
            row.geo.to_wkt().as_str(),
        ])?;
    }
    writer.flush()?;

    std::fs::write(&snapshot_path, serde_json::to_string_pretty(table)?)?;

    info!("Wrote {} result rows to {:?}", table.len(), csv_path);
    info!("Wrote table snapshot to {:?}", snapshot_path);
    Ok(ArtifactPaths {
        csv: csv_path,
        snapshot: snapshot_path,
    })
}
