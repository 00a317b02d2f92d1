use std::time::{Duration, Instant};

use align::{AlignmentError, AlignmentWarning, MatchConfig};
use rayon::prelude::*;
use serde::Serialize;
use shorts_core::{
    timecode::{duration_ms, Timecode, TimecodeRange},
    Highlight, HighlightRequest, Timeframe, TranscriptSequence,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightStatus {
    Resolved,
    NoMatch,
    TimedOut,
}

/// The timeline entry for one highlight, in the shape the renderer consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightOutcome {
    pub index: String,
    pub title: String,
    pub text: String,
    pub status: HighlightStatus,
    /// seconds of speech covered, 0 unless resolved
    pub duration: f64,
    pub duration_ms: i64,
    pub timeframes: Vec<TimecodeRange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HighlightOutcome {
    fn unresolved(request: &HighlightRequest, status: HighlightStatus, error: String) -> Self {
        HighlightOutcome {
            index: request.index.clone(),
            title: request.title.clone(),
            text: request.text.clone(),
            status,
            duration: 0.0,
            duration_ms: 0,
            timeframes: vec![],
            warnings: vec![],
            error: Some(error),
        }
    }

    fn resolved(
        request: &HighlightRequest,
        timeframes: Vec<Timeframe>,
        warnings: &[AlignmentWarning],
        frame_rate: u32,
    ) -> Self {
        let highlight = Highlight::new(request, timeframes);
        let duration_ms = highlight
            .timeframes
            .iter()
            .map(|tf| {
                let start = Timecode::from_seconds(tf.start, frame_rate);
                let end = Timecode::from_seconds(tf.end, frame_rate);
                duration_ms(&start, &end, frame_rate)
            })
            .sum();
        HighlightOutcome {
            index: request.index.clone(),
            duration: highlight.total_duration(),
            duration_ms,
            timeframes: highlight
                .timeframes
                .iter()
                .map(|tf| TimecodeRange::from_seconds(tf.start, tf.end, frame_rate))
                .collect(),
            title: highlight.title,
            text: highlight.text,
            status: HighlightStatus::Resolved,
            warnings: warnings.iter().map(ToString::to_string).collect(),
            error: None,
        }
    }
}

/// Resolve one highlight, treating a result that took longer than `timeout` as lost.
pub fn resolve_highlight(
    transcript: &TranscriptSequence,
    request: &HighlightRequest,
    config: &MatchConfig,
    timeout: Option<Duration>,
) -> HighlightOutcome {
    let started = Instant::now();
    let result = align::resolve_timeframes(transcript, &request.text, config);
    let elapsed = started.elapsed();

    if let Some(timeout) = timeout {
        if elapsed >= timeout {
            log::warn!(
                "highlight {} took {:?}, over the {:?} budget",
                request.index,
                elapsed,
                timeout
            );
            return HighlightOutcome::unresolved(
                request,
                HighlightStatus::TimedOut,
                format!("resolution took {:?}", elapsed),
            );
        }
    }

    match result {
        Ok(resolution) => {
            log::info!(
                "highlight {} resolved to {} timeframe(s), {:.2}s",
                request.index,
                resolution.timeframes.len(),
                resolution.total_duration()
            );
            HighlightOutcome::resolved(
                request,
                resolution.timeframes,
                &resolution.warnings,
                config.frame_rate,
            )
        }
        Err(e @ AlignmentError::NoMatchFound { .. }) | Err(e @ AlignmentError::EmptySpan) => {
            log::warn!("highlight {} skipped: {}", request.index, e);
            HighlightOutcome::unresolved(request, HighlightStatus::NoMatch, e.to_string())
        }
        Err(e) => {
            log::error!("highlight {} failed: {}", request.index, e);
            HighlightOutcome::unresolved(request, HighlightStatus::NoMatch, e.to_string())
        }
    }
}

/// Resolve every request against the same transcript, in parallel.
///
/// Outcomes come back in request order, and a failed highlight never stops the others.
pub fn resolve_all(
    transcript: &TranscriptSequence,
    requests: &[HighlightRequest],
    config: &MatchConfig,
    timeout: Option<Duration>,
) -> Vec<HighlightOutcome> {
    requests
        .par_iter()
        .map(|request| resolve_highlight(transcript, request, config, timeout))
        .collect()
}
