use shorts_core::TranscriptSequence;

use crate::{cue_token, TranscriptError};

/// Parse a SubRip file, one token per subtitle.
pub fn parse_subrip(content: &str) -> Result<TranscriptSequence, TranscriptError> {
    let subs = subrip::parse(content)
        .map_err(|e| TranscriptError::Structure(format!("could not parse SubRip: {:?}", e)))?;

    let total = subs.len();
    let tokens = subs
        .iter()
        .filter_map(|sub| {
            cue_token(
                sub.text.lines(),
                sub.start.as_secs_f64(),
                sub.end.as_secs_f64(),
            )
        })
        .collect::<Vec<_>>();
    if tokens.len() < total {
        log::debug!("dropped {} empty SubRip subtitles", total - tokens.len());
    }
    Ok(TranscriptSequence::new(tokens)?)
}
