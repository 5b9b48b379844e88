//! Spatial clustering stage
//!
//! Rewrites every frame's token list into candidate location strings by
//! clustering detections on bounding-box proximity and recombining the
//! members of each cluster.

pub mod candidates;
pub mod density;

use tracing::{debug, info};

use crate::config::ClusterConfig;
use crate::ocr::FrameMap;

/// Replace each frame's tokens with its candidate strings
pub fn expand_frames(frames: &mut FrameMap, config: &ClusterConfig) {
    for (frame_nr, group) in frames.iter_mut() {
        let points: Vec<[f64; 4]> = group.boxes.iter().map(|b| b.as_vector()).collect();
        let labels = density::cluster_labels(&points, config);
        let expanded =
            candidates::candidate_strings(&group.strings, &labels, config.min_candidate_length);
        debug!(
            "Frame {}: {} detections -> {} candidates",
            frame_nr,
            group.detection_count(),
            expanded.len()
        );
        group.strings = expanded;
    }

    let total: usize = frames.values().map(|group| group.strings.len()).sum();
    info!(
        "Clustering produced {} candidate strings across {} frames",
        total,
        frames.len()
    );
}
