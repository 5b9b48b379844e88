//! Pipeline driver
//!
//! Wires the stages end to end: read and prefilter the OCR log, expand
//! every frame into candidate strings, resolve them against the gazetteer
//! and persist the artifacts.

use std::path::Path;
use tracing::info;

use crate::cluster;
use crate::config::AppConfig;
use crate::error::GeoparseError;
use crate::gazetteer::Gazetteer;
use crate::ocr;
use crate::report::{self, ResultTable};
use crate::resolve::Resolver;

/// Run the whole geoparsing pipeline over one OCR log
///
/// An empty table means no candidate ever matched; no files are written in
/// that case.
pub fn run<G: Gazetteer>(
    log_path: &Path,
    output_dir: &Path,
    video_name: &str,
    gazetteer: G,
    config: &AppConfig,
) -> Result<ResultTable, GeoparseError> {
    info!("Geoparsing OCR log {:?}", log_path);

    let mut frames = ocr::read_ocr_log(log_path, &config.prefilter)?;
    cluster::expand_frames(&mut frames, &config.cluster);

    let mut resolver = Resolver::new(gazetteer, config.resolver.clone());
    let table = resolver.resolve_frames(&frames)?;

    if table.is_empty() {
        info!("No output files written");
        return Ok(table);
    }

    let paths = report::write_artifacts(&table, output_dir, video_name)?;
    info!("Geoparsing finished: {:?}", paths.csv);
    Ok(table)
}
