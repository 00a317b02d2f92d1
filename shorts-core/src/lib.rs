use std::fmt::Debug;

use serde::{Deserialize, Serialize};

pub mod clean_text;
pub mod timecode;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SequenceError {
    #[error("token {index} ({text:?}) has invalid timing: start={start}, end={end}")]
    InvalidTiming {
        index: usize,
        text: String,
        start: f64,
        end: f64,
    },
    #[error("token {index} ({text:?}) starts at {start}, before the previous token started at {previous_start}")]
    StartRegressed {
        index: usize,
        text: String,
        start: f64,
        previous_start: f64,
    },
    #[error("token {index} ({text:?}) ends at {end}, before the previous token ended at {previous_end}")]
    EndRegressed {
        index: usize,
        text: String,
        end: f64,
        previous_end: f64,
    },
}

/// Only pronunciation tokens carry trustworthy timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Pronunciation,
    Punctuation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedToken {
    pub text: String,
    pub kind: TokenKind,
    pub start: f64,
    pub end: f64,
}

impl TimedToken {
    pub fn pronunciation<S: Into<String>>(text: S, start: f64, end: f64) -> TimedToken {
        TimedToken {
            text: text.into(),
            kind: TokenKind::Pronunciation,
            start,
            end,
        }
    }

    /// Punctuation has no timing of its own, the times are zeroed and must not be read.
    pub fn punctuation<S: Into<String>>(text: S) -> TimedToken {
        TimedToken {
            text: text.into(),
            kind: TokenKind::Punctuation,
            start: 0.0,
            end: 0.0,
        }
    }

    pub fn is_pronunciation(&self) -> bool {
        self.kind == TokenKind::Pronunciation
    }
}

/// The time-coded transcript for one piece of media.
///
/// Tokens are kept in the order they were spoken. A sequence can only be
/// built through [`TranscriptSequence::new`], which checks that every
/// pronunciation token has sane timing and that timings never go backwards.
/// Caption transcripts produce one token per cue, so the same type serves
/// both word-level and segment-level granularity.
#[derive(Clone, PartialEq, Serialize)]
pub struct TranscriptSequence {
    tokens: Vec<TimedToken>,
}

impl TranscriptSequence {
    pub fn new(tokens: Vec<TimedToken>) -> Result<TranscriptSequence, SequenceError> {
        let mut previous: Option<(f64, f64)> = None;
        for (index, token) in tokens.iter().enumerate() {
            if !token.is_pronunciation() {
                continue;
            }
            let valid = token.start.is_finite()
                && token.end.is_finite()
                && token.start >= 0.0
                && token.start <= token.end;
            if !valid {
                return Err(SequenceError::InvalidTiming {
                    index,
                    text: token.text.clone(),
                    start: token.start,
                    end: token.end,
                });
            }
            if let Some((prev_start, prev_end)) = previous {
                // adjacent words may share a boundary, or overlap slightly in
                // caption files, but neither bound may move back past the last token's.
                if token.start < prev_start {
                    return Err(SequenceError::StartRegressed {
                        index,
                        text: token.text.clone(),
                        start: token.start,
                        previous_start: prev_start,
                    });
                }
                if token.end < prev_end {
                    return Err(SequenceError::EndRegressed {
                        index,
                        text: token.text.clone(),
                        end: token.end,
                        previous_end: prev_end,
                    });
                }
            }
            previous = Some((token.start, token.end));
        }
        Ok(TranscriptSequence { tokens })
    }

    pub fn tokens(&self) -> &[TimedToken] {
        self.tokens.as_slice()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&TimedToken> {
        self.tokens.get(index)
    }

    pub fn pronunciation_count(&self) -> usize {
        self.tokens.iter().filter(|t| t.is_pronunciation()).count()
    }

    /// End of the last spoken token, zero for an empty transcript.
    pub fn duration(&self) -> f64 {
        self.tokens
            .iter()
            .rev()
            .find(|t| t.is_pronunciation())
            .map(|t| t.end)
            .unwrap_or_default()
    }
}

impl Debug for TranscriptSequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptSequence")
            .field("tokens", &self.tokens.len())
            .field("duration", &self.duration())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timeframe {
    pub start: f64,
    pub end: f64,
    /// position of the segment in the candidate span this timeframe came from
    pub original_order: usize,
}

impl Timeframe {
    pub fn new(start: f64, end: f64, original_order: usize) -> Timeframe {
        Timeframe {
            start,
            end,
            original_order,
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// A highlight the upstream extraction step asked us to place on the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighlightRequest {
    pub index: String,
    #[serde(default)]
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub text: String,
    pub title: String,
    pub timeframes: Vec<Timeframe>,
}

impl Highlight {
    pub fn new(request: &HighlightRequest, timeframes: Vec<Timeframe>) -> Highlight {
        Highlight {
            text: request.text.clone(),
            title: request.title.clone(),
            timeframes,
        }
    }

    pub fn total_duration(&self) -> f64 {
        self.timeframes.iter().map(Timeframe::duration).sum()
    }
}
