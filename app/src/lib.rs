use std::path::{Path, PathBuf};

use shorts_core::{HighlightRequest, TranscriptSequence};

mod batch;
pub mod settings;

pub use batch::{resolve_all, resolve_highlight, HighlightOutcome, HighlightStatus};
pub use settings::{ConfigBuilder, ConfigError, Settings};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transcript(#[from] transcript::TranscriptError),
    #[error("could not read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed highlight requests in {path:?}")]
    Highlights {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn read_file(path: &Path) -> Result<Vec<u8>, AppError> {
    std::fs::read(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Read and validate a transcript, detecting its format from the extension and content.
pub fn load_transcript_file(path: &Path) -> Result<TranscriptSequence, AppError> {
    let bytes = read_file(path)?;
    let seq = transcript::load_transcript_bytes(bytes, Some(path))?;
    log::info!(
        "loaded {} tokens ({} spoken) from {:?}",
        seq.len(),
        seq.pronunciation_count(),
        path
    );
    Ok(seq)
}

/// Read a JSON list of highlight requests.
pub fn load_highlights_file(path: &Path) -> Result<Vec<HighlightRequest>, AppError> {
    let bytes = read_file(path)?;
    serde_json::from_slice(&bytes).map_err(|source| AppError::Highlights {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve a batch of highlights with the matching options from `settings`.
///
/// Only a bad configuration fails the batch; every highlight gets an outcome.
pub fn resolve_batch(
    transcript: &TranscriptSequence,
    requests: &[HighlightRequest],
    settings: &Settings,
) -> Result<Vec<HighlightOutcome>, AppError> {
    let config = settings.match_config()?;
    let timeout = settings.resolve_timeout()?;
    log::debug!(
        "resolving {} highlight(s) with {:?}, timeout {:?}",
        requests.len(),
        config,
        timeout
    );
    Ok(resolve_all(transcript, requests, &config, timeout))
}
