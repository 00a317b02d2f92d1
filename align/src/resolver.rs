use shorts_core::{TimedToken, Timeframe, TranscriptSequence};

use crate::matcher::MatchWindow;

/// Walk inward from both ends of `start..=end` until each boundary is a spoken token.
///
/// Returns `None` if the range holds no spoken token at all.
pub fn trim_boundaries(tokens: &[TimedToken], start: usize, end: usize) -> Option<(usize, usize)> {
    if tokens.is_empty() {
        return None;
    }
    let mut start = start;
    let mut end = end.min(tokens.len() - 1);
    while start <= end && !tokens[start].is_pronunciation() {
        start += 1;
    }
    while end > start && !tokens[end].is_pronunciation() {
        end -= 1;
    }
    if start > end || !tokens[start].is_pronunciation() {
        return None;
    }
    Some((start, end))
}

/// Sort by start time, then fold overlapping or touching timeframes together.
///
/// A merged timeframe keeps the `original_order` of the one that started first.
pub fn sort_and_merge(mut timeframes: Vec<Timeframe>) -> Vec<Timeframe> {
    timeframes.sort_by(|a, b| a.start.total_cmp(&b.start));
    let mut merged: Vec<Timeframe> = Vec::with_capacity(timeframes.len());
    for tf in timeframes {
        match merged.last_mut() {
            Some(prev) if tf.start <= prev.end => {
                log::trace!("merging {:?} into {:?}", tf, prev);
                prev.end = prev.end.max(tf.end);
            }
            _ => merged.push(tf),
        }
    }
    merged
}

/// The segment order of `timeframes` if it differs from the text order.
pub fn order_inversion(timeframes: &[Timeframe]) -> Option<Vec<usize>> {
    let order = timeframes
        .iter()
        .map(|tf| tf.original_order)
        .collect::<Vec<_>>();
    let mut sorted = order.clone();
    sorted.sort_unstable();
    if order == sorted {
        None
    } else {
        Some(order)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub timeframes: Vec<Timeframe>,
    pub inversion: Option<Vec<usize>>,
}

/// Turn accepted windows, tagged with their segment order, into a clean timeline.
pub fn resolve(transcript: &TranscriptSequence, accepted: &[(usize, MatchWindow)]) -> Resolved {
    let tokens = transcript.tokens();
    let timeframes = accepted
        .iter()
        .filter_map(|(order, window)| {
            let trimmed = trim_boundaries(tokens, window.start_index, window.end_index);
            if trimmed.is_none() {
                log::warn!("segment {} matched a window with no spoken tokens", order);
            }
            trimmed.map(|(start, end)| Timeframe::new(tokens[start].start, tokens[end].end, *order))
        })
        .collect::<Vec<_>>();

    let timeframes = sort_and_merge(timeframes);
    let inversion = order_inversion(&timeframes);
    if let Some(order) = &inversion {
        log::warn!(
            "segments resolved out of text order {:?}, keeping chronological order",
            order
        );
    }
    Resolved {
        timeframes,
        inversion,
    }
}
