//! Loading time-coded transcripts into a [`TranscriptSequence`].
//!
//! Two families of input are understood: word level token lists (a bare
//! JSON array of token records, or the `results.items` envelope a
//! transcription job writes) and caption files (WebVTT or SubRip).
use std::path::Path;

use shorts_core::{SequenceError, TimedToken, TranscriptSequence};

mod srt;
mod tokens;
mod vtt;

pub use srt::parse_subrip;
pub use tokens::parse_token_json;
pub use vtt::parse_webvtt;

/// Anything that stops a transcript from loading. These are always fatal for
/// the request, there is no partial transcript to fall back on.
#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    #[error("malformed transcript JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed transcript: token {index}: {reason}")]
    Token { index: usize, reason: String },
    #[error("malformed transcript: caption line {line}: {reason}")]
    Caption { line: usize, reason: String },
    #[error("malformed transcript: {0}")]
    Structure(String),
    #[error("malformed transcript: {0}")]
    Sequence(#[from] SequenceError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptFormat {
    /// word level token records
    Json,
    WebVtt,
    SubRip,
}

impl TranscriptFormat {
    /// Guess the format, preferring the file extension when there is one.
    pub fn detect(content: &str, path: Option<&Path>) -> TranscriptFormat {
        let ext = path
            .and_then(|p| p.extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());
        match ext.as_deref() {
            Some("json") => return TranscriptFormat::Json,
            Some("vtt") => return TranscriptFormat::WebVtt,
            Some("srt") => return TranscriptFormat::SubRip,
            _ => {}
        }
        let head = content.trim_start_matches('\u{feff}').trim_start();
        if head.starts_with('{') || head.starts_with('[') {
            TranscriptFormat::Json
        } else if head.starts_with("WEBVTT") {
            TranscriptFormat::WebVtt
        } else {
            TranscriptFormat::SubRip
        }
    }
}

pub fn parse_transcript(
    content: &str,
    format: TranscriptFormat,
) -> Result<TranscriptSequence, TranscriptError> {
    let content = content.trim_start_matches('\u{feff}');
    let seq = match format {
        TranscriptFormat::Json => parse_token_json(content)?,
        TranscriptFormat::WebVtt => parse_webvtt(content)?,
        TranscriptFormat::SubRip => parse_subrip(content)?,
    };
    log::debug!("loaded transcript as {:?}: {:?}", format, seq);
    Ok(seq)
}

/// Load raw transcript bytes, detecting the format from `path` and content.
pub fn load_transcript_bytes(
    bytes: Vec<u8>,
    path: Option<&Path>,
) -> Result<TranscriptSequence, TranscriptError> {
    let text = decode_text(bytes, path);
    let format = TranscriptFormat::detect(&text, path);
    parse_transcript(&text, format)
}

/// Drop inline markup like `<v Speaker>` or `<i>`.
fn strip_tags(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_tag = false;
    for c in line.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// One spoken token for a caption cue, or `None` if the cue has no text.
///
/// Lines are joined with spaces and leading dialogue dashes removed.
pub(crate) fn cue_token<'a>(
    lines: impl Iterator<Item = &'a str>,
    start: f64,
    end: f64,
) -> Option<TimedToken> {
    let text = lines
        .map(strip_tags)
        .map(|line| line.trim().trim_start_matches('-').trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if text.is_empty() {
        None
    } else {
        Some(TimedToken::pronunciation(text, start, end))
    }
}

/// Decode transcript bytes as UTF-8, falling back to WINDOWS_1252.
pub fn decode_text(bytes: Vec<u8>, path: Option<&Path>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let v = e.into_bytes();
            // caption files are often WINDOWS_1252, but there is no requirement, so who knows
            let (text, encoding, replacements) = encoding_rs::WINDOWS_1252.decode(v.as_slice());
            if replacements {
                log::warn!(
                    "could not decode {:?} accurately with {}",
                    path,
                    encoding.name()
                );
            }
            text.to_string()
        }
    }
}
