//! OCR log prefiltering
//!
//! Reads the semicolon-delimited OCR log and keeps only detections worth
//! geoparsing: confident enough, not drowning in recognition artifacts and
//! not purely numeric. Survivors are grouped by source frame.

use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::PrefilterConfig;
use crate::error::GeoparseError;
use crate::ocr::normalize::{is_pure_digits, noise_char_count, normalize, NOISE_CHARS};
use crate::ocr::{BBox, Detection, FrameMap};

/// Column layout of the OCR log after the header row
const COL_FRAME: usize = 0;
const COL_TEXT: usize = 1;
const COL_CONFIDENCE: usize = 2;
const COL_BBOX_XMIN: usize = 3;
const COL_BBOX_YMAX: usize = 6;

/// Read an OCR log and group surviving detections by frame
///
/// Per-row failures (bad confidence, bad coordinates, short rows) skip the
/// row and keep going; only failing to open or read the file is an error.
pub fn read_ocr_log(path: &Path, config: &PrefilterConfig) -> Result<FrameMap, GeoparseError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .quoting(false)
        .flexible(true)
        .has_headers(true)
        .from_path(path)?;

    let mut frames = FrameMap::new();
    let mut kept = 0usize;
    let mut skipped = 0usize;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("Skipping unreadable OCR log row: {}", e);
                skipped += 1;
                continue;
            }
        };

        if record.len() <= COL_BBOX_YMAX {
            warn!(
                "Skipping OCR log row with {} columns (expected at least {})",
                record.len(),
                COL_BBOX_YMAX + 1
            );
            skipped += 1;
            continue;
        }

        let frame_nr = &record[COL_FRAME];
        let raw_text = &record[COL_TEXT];

        let confidence = match parse_confidence(&record[COL_CONFIDENCE]) {
            Ok(confidence) => confidence,
            Err(e) => {
                debug!("Dropping row in frame {}: {}", frame_nr, e);
                skipped += 1;
                continue;
            }
        };
        if confidence < config.confidence_threshold {
            debug!(
                "Dropping '{}' in frame {}: confidence {} below threshold",
                raw_text, frame_nr, confidence
            );
            skipped += 1;
            continue;
        }

        if noise_char_count(raw_text, NOISE_CHARS) > config.max_noise_chars {
            debug!("Dropping '{}' in frame {}: too many noise characters", raw_text, frame_nr);
            skipped += 1;
            continue;
        }

        let polished = normalize(raw_text, NOISE_CHARS);
        if is_pure_digits(&polished) {
            debug!("Dropping '{}' in frame {}: digits only", polished, frame_nr);
            skipped += 1;
            continue;
        }

        // All four coordinates must parse before anything lands in the
        // parallel sequences.
        let bbox = match parse_bbox(&record) {
            Ok(bbox) => bbox,
            Err(e) => {
                warn!("Excluding '{}' in frame {}: {}", raw_text, frame_nr, e);
                skipped += 1;
                continue;
            }
        };

        let detection = Detection {
            frame_nr: frame_nr.to_string(),
            text: raw_text.to_string(),
            confidence,
            bbox,
        };
        debug!(
            "Keeping '{}' (confidence {}) in frame {}",
            detection.text, detection.confidence, detection.frame_nr
        );
        frames
            .entry(detection.frame_nr)
            .or_default()
            .push(polished, detection.bbox);
        kept += 1;
    }

    info!(
        "Prefilter kept {} detections across {} frames ({} rows dropped)",
        kept,
        frames.len(),
        skipped
    );
    Ok(frames)
}

/// Parse a confidence field, rounded to two decimals
fn parse_confidence(raw: &str) -> Result<f64, GeoparseError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| GeoparseError::parse("confidence", raw))?;
    Ok((value * 100.0).round() / 100.0)
}

/// Parse the four bounding-box columns, rounded to integer pixels
fn parse_bbox(record: &csv::StringRecord) -> Result<BBox, GeoparseError> {
    let mut coords = [0i32; 4];
    for (slot, col) in (COL_BBOX_XMIN..=COL_BBOX_YMAX).enumerate() {
        let raw = &record[col];
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| GeoparseError::parse("bounding box", raw))?;
        coords[slot] = value.round() as i32;
    }
    Ok(BBox {
        xmin: coords[0],
        ymin: coords[1],
        xmax: coords[2],
        ymax: coords[3],
    })
}
