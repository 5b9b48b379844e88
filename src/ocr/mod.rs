//! OCR transcript layer
//!
//! Types and filtering for per-frame text detections read from an OCR log.
//! Detections survive into per-frame token groups; the clustering stage
//! later rewrites each group's token list with candidate strings.

pub mod normalize;
pub mod prefilter;

pub use prefilter::read_ocr_log;

use std::collections::BTreeMap;

/// Axis-aligned bounding box in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BBox {
    pub xmin: i32,
    pub ymin: i32,
    pub xmax: i32,
    pub ymax: i32,
}

impl BBox {
    /// Corner coordinates as a 4-dimensional feature vector
    pub fn as_vector(&self) -> [f64; 4] {
        [
            self.xmin as f64,
            self.ymin as f64,
            self.xmax as f64,
            self.ymax as f64,
        ]
    }
}

/// One OCR hit parsed from a log row
#[derive(Debug, Clone)]
pub struct Detection {
    /// Source frame identifier
    pub frame_nr: String,
    /// Raw detected text, before cleanup
    pub text: String,
    /// Recognition confidence (0.0 - 1.0), rounded to two decimals
    pub confidence: f64,
    /// Location of the text in the frame
    pub bbox: BBox,
}

/// Surviving tokens of one frame, as parallel sequences
///
/// `strings[i]` belongs to `boxes[i]` while the group holds raw detections.
/// The clusterer replaces `strings` wholesale with the generated candidate
/// list; `boxes` keeps describing the original detections throughout.
#[derive(Debug, Clone, Default)]
pub struct FrameTokenGroup {
    /// Normalized token texts (later: candidate strings)
    pub strings: Vec<String>,
    /// Bounding boxes of the original detections
    pub boxes: Vec<BBox>,
}

impl FrameTokenGroup {
    /// Append one surviving detection, keeping the sequences parallel
    pub fn push(&mut self, text: String, bbox: BBox) {
        self.strings.push(text);
        self.boxes.push(bbox);
    }

    /// Number of original detections in the group
    pub fn detection_count(&self) -> usize {
        self.boxes.len()
    }
}

/// Frames keyed by identifier, iterated in ascending frame order
pub type FrameMap = BTreeMap<String, FrameTokenGroup>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bbox_as_vector() {
        let bbox = BBox {
            xmin: 10,
            ymin: 20,
            xmax: 110,
            ymax: 60,
        };
        assert_eq!(bbox.as_vector(), [10.0, 20.0, 110.0, 60.0]);
    }

    #[test]
    fn test_frame_token_group_push_keeps_sequences_parallel() {
        let mut group = FrameTokenGroup::default();
        group.push(
            "Gare Cornavin".to_string(),
            BBox {
                xmin: 0,
                ymin: 0,
                xmax: 50,
                ymax: 20,
            },
        );
        group.push(
            "Rue du Mont-Blanc".to_string(),
            BBox {
                xmin: 60,
                ymin: 0,
                xmax: 140,
                ymax: 20,
            },
        );

        assert_eq!(group.strings.len(), group.boxes.len());
        assert_eq!(group.detection_count(), 2);
    }
}
