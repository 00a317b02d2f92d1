//! Locate the spoken timeframes of a highlight inside a timed transcript.
//!
//! A candidate span is split on the gap marker, every piece is fuzzily
//! matched against sliding windows of the transcript, and the accepted
//! windows are resolved into sorted, non-overlapping [`Timeframe`]s.
use serde::Serialize;
use shorts_core::{Timeframe, TranscriptSequence};

mod config;
mod error;
pub mod matcher;
pub mod normalize;
pub mod resolver;
pub mod segment;
pub mod similarity;

pub use config::{
    MatchConfig, DEFAULT_ACCEPTANCE_THRESHOLD, DEFAULT_GAP_MARKER, DEFAULT_WINDOW_OFFSETS,
};
pub use error::{AlignmentError, AlignmentWarning};
pub use matcher::{MatchWindow, WindowMatcher};
pub use similarity::{Similarity, SimilarityMetric, UnknownMetric};

/// How a single segment of the span fared.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentMatch {
    pub order: usize,
    pub segment: String,
    pub best: Option<MatchWindow>,
    pub accepted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    /// chronological, non-overlapping
    pub timeframes: Vec<Timeframe>,
    pub matches: Vec<SegmentMatch>,
    pub warnings: Vec<AlignmentWarning>,
}

impl Resolution {
    pub fn total_duration(&self) -> f64 {
        self.timeframes.iter().map(Timeframe::duration).sum()
    }
}

/// Find the timeframes `span` was spoken at.
///
/// A segment is accepted when its best score exceeds the acceptance
/// threshold; the rest are dropped with a warning. The call only fails if
/// the config is invalid, the span has no text, or no segment is accepted.
pub fn resolve_timeframes(
    transcript: &TranscriptSequence,
    span: &str,
    config: &MatchConfig,
) -> Result<Resolution, AlignmentError> {
    config.validate()?;

    let segments = segment::split_segments(span, &config.gap_marker);
    if segments.is_empty() {
        return Err(AlignmentError::EmptySpan);
    }
    log::debug!("matching {} segment(s) of {:?}", segments.len(), span);

    let matcher = WindowMatcher::new(transcript, config.similarity_metric);
    let mut matches = Vec::with_capacity(segments.len());
    let mut accepted = Vec::new();
    let mut warnings = Vec::new();

    for (order, segment) in segments.into_iter().enumerate() {
        let normalized = normalize::normalize(&segment);
        let sizes = config.window_sizes(normalize::word_count(&normalized));
        let best = matcher.best_window(&normalized, &sizes);

        let is_accepted = best
            .as_ref()
            .map(|w| w.score > config.acceptance_threshold)
            .unwrap_or(false);

        match &best {
            Some(w) if is_accepted => {
                log::debug!(
                    "segment {} {:?} matched {:?} with score {:.3}",
                    order,
                    segment,
                    w.window_text,
                    w.score
                );
                accepted.push((order, w.clone()));
            }
            _ => {
                let best_score = best.as_ref().map(|w| w.score);
                let warning = AlignmentWarning::SegmentDropped { order, best_score };
                log::warn!("{:?}: {}", segment, warning);
                warnings.push(warning);
            }
        }

        matches.push(SegmentMatch {
            order,
            segment,
            best,
            accepted: is_accepted,
        });
    }

    if accepted.is_empty() {
        let best_score = matches
            .iter()
            .filter_map(|m| m.best.as_ref().map(|w| w.score))
            .fold(0.0, f64::max);
        return Err(AlignmentError::NoMatchFound {
            segments: matches.len(),
            best_score,
        });
    }

    if accepted.len() < matches.len() {
        let warning = AlignmentWarning::PartialMatch {
            matched: accepted.len(),
            total: matches.len(),
        };
        log::warn!("{}", warning);
        warnings.push(warning);
    }

    let resolved = resolver::resolve(transcript, &accepted);
    if let Some(order) = resolved.inversion {
        warnings.push(AlignmentWarning::OrderInversion { order });
    }

    Ok(Resolution {
        timeframes: resolved.timeframes,
        matches,
        warnings,
    })
}
