use serde::{Deserialize, Serialize};
use shorts_core::timecode::DEFAULT_FRAME_RATE;

use crate::{similarity::SimilarityMetric, AlignmentError};

pub const DEFAULT_GAP_MARKER: &str = "[...]";
pub const DEFAULT_ACCEPTANCE_THRESHOLD: f64 = 0.7;
/// window sizes tried around the segment word count, in this order
pub const DEFAULT_WINDOW_OFFSETS: &[i64] = &[0, -1, 1, 2];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub gap_marker: String,
    pub acceptance_threshold: f64,
    pub frame_rate: u32,
    pub similarity_metric: SimilarityMetric,
    pub window_offsets: Vec<i64>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        MatchConfig {
            gap_marker: DEFAULT_GAP_MARKER.to_string(),
            acceptance_threshold: DEFAULT_ACCEPTANCE_THRESHOLD,
            frame_rate: DEFAULT_FRAME_RATE,
            similarity_metric: SimilarityMetric::default(),
            window_offsets: DEFAULT_WINDOW_OFFSETS.to_vec(),
        }
    }
}

impl MatchConfig {
    pub fn validate(&self) -> Result<(), AlignmentError> {
        let invalid = |msg: &str| Err(AlignmentError::InvalidConfig(msg.to_string()));
        if !(0.0..=1.0).contains(&self.acceptance_threshold) {
            return invalid("acceptance_threshold must be within [0, 1]");
        }
        if self.frame_rate == 0 {
            return invalid("frame_rate must be greater than zero");
        }
        if self.gap_marker.trim().is_empty() {
            return invalid("gap_marker must not be blank");
        }
        if self.window_offsets.is_empty() {
            return invalid("window_offsets must list at least one offset");
        }
        Ok(())
    }

    /// Window sizes, in words, to try for a segment of `target` words.
    pub fn window_sizes(&self, target: usize) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.window_offsets.len());
        for offset in &self.window_offsets {
            let size = (target as i64 + offset).max(1) as usize;
            if !sizes.contains(&size) {
                sizes.push(size);
            }
        }
        sizes
    }
}
