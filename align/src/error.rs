use std::fmt;

use serde::Serialize;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AlignmentError {
    /// No segment of the span cleared the acceptance threshold. The highlight
    /// is skipped, the rest of the batch carries on.
    #[error("no timeframe found: none of {segments} segment(s) matched (best score {best_score:.3})")]
    NoMatchFound { segments: usize, best_score: f64 },
    #[error("candidate span has no text to match")]
    EmptySpan,
    #[error("invalid match configuration: {0}")]
    InvalidConfig(String),
}

/// Problems that do not stop a highlight from resolving but deserve a look.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlignmentWarning {
    SegmentDropped {
        order: usize,
        best_score: Option<f64>,
    },
    PartialMatch {
        matched: usize,
        total: usize,
    },
    OrderInversion {
        order: Vec<usize>,
    },
}

impl fmt::Display for AlignmentWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentWarning::SegmentDropped {
                order,
                best_score: Some(score),
            } => write!(f, "segment {} dropped, best score {:.3}", order, score),
            AlignmentWarning::SegmentDropped {
                order,
                best_score: None,
            } => write!(f, "segment {} dropped, nothing to compare", order),
            AlignmentWarning::PartialMatch { matched, total } => {
                write!(f, "only {} of {} segments matched", matched, total)
            }
            AlignmentWarning::OrderInversion { order } => {
                write!(f, "segments matched out of text order: {:?}", order)
            }
        }
    }
}
