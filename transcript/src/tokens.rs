use serde::Deserialize;
use shorts_core::{TimedToken, TokenKind, TranscriptSequence};

use crate::TranscriptError;

/// Times are numbers in hand written token lists, but strings in transcription job output.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Seconds {
    Number(f64),
    Text(String),
}

impl Seconds {
    fn value(&self) -> Result<f64, String> {
        match self {
            Seconds::Number(n) => Ok(*n),
            Seconds::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("time {:?} is not a number", s)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Alternative {
    content: String,
}

#[derive(Debug, Deserialize)]
struct TokenRecord {
    #[serde(default)]
    content: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    start_time: Option<Seconds>,
    #[serde(default)]
    end_time: Option<Seconds>,
    #[serde(default)]
    alternatives: Vec<Alternative>,
}

impl TokenRecord {
    fn into_token(self, index: usize) -> Result<TimedToken, TranscriptError> {
        let bad = |reason: String| TranscriptError::Token { index, reason };

        let TokenRecord {
            content,
            kind,
            start_time,
            end_time,
            alternatives,
        } = self;

        let text = content
            .or_else(|| alternatives.into_iter().next().map(|a| a.content))
            .ok_or_else(|| bad("missing content".to_string()))?;

        let kind = match kind.as_deref() {
            Some("pronunciation") => TokenKind::Pronunciation,
            Some("punctuation") => TokenKind::Punctuation,
            Some(other) => return Err(bad(format!("unknown token type {:?}", other))),
            None => return Err(bad("missing type".to_string())),
        };

        match kind {
            TokenKind::Punctuation => Ok(TimedToken::punctuation(text)),
            TokenKind::Pronunciation => {
                let start = start_time
                    .ok_or_else(|| bad("missing start_time".to_string()))?
                    .value()
                    .map_err(bad)?;
                let end = end_time
                    .ok_or_else(|| bad("missing end_time".to_string()))?
                    .value()
                    .map_err(bad)?;
                Ok(TimedToken::pronunciation(text, start, end))
            }
        }
    }
}

fn records_from_value(value: serde_json::Value) -> Result<Vec<TokenRecord>, TranscriptError> {
    let items = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Object(mut obj) => {
            let results = obj
                .remove("results")
                .ok_or_else(|| TranscriptError::Structure("missing `results`".to_string()))?;
            match results {
                serde_json::Value::Object(mut results) => results.remove("items").ok_or_else(
                    || TranscriptError::Structure("missing `results.items`".to_string()),
                )?,
                _ => {
                    return Err(TranscriptError::Structure(
                        "`results` is not an object".to_string(),
                    ))
                }
            }
        }
        _ => {
            return Err(TranscriptError::Structure(
                "expected a token array or a `results` object".to_string(),
            ))
        }
    };
    Ok(serde_json::from_value(items)?)
}

/// Parse a flat token list, or the `{"results": {"items": [...]}}` envelope around one.
pub fn parse_token_json(content: &str) -> Result<TranscriptSequence, TranscriptError> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    let records = records_from_value(value)?;
    let tokens = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| record.into_token(index))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TranscriptSequence::new(tokens)?)
}
