use shorts_core::TranscriptSequence;

use crate::{cue_token, TranscriptError};

const ARROW: &str = "-->";

struct Cue {
    start: f64,
    end: f64,
    lines: Vec<String>,
}

/// Parse `HH:MM:SS.mmm` or `MM:SS.mmm`. A `,` before the millis is tolerated.
fn parse_timestamp(ts: &str) -> Option<f64> {
    let fields = ts.trim().split(':').collect::<Vec<_>>();
    let (hours, minutes, seconds) = match fields.as_slice() {
        [h, m, s] => (h.parse::<u64>().ok()?, m.parse::<u64>().ok()?, *s),
        [m, s] => (0, m.parse::<u64>().ok()?, *s),
        _ => return None,
    };
    let seconds = seconds.replace(',', ".").parse::<f64>().ok()?;
    if minutes >= 60 || !(0.0..60.0).contains(&seconds) {
        return None;
    }
    Some((hours * 3600 + minutes * 60) as f64 + seconds)
}

fn parse_timing_line(line: &str, line_no: usize) -> Result<(f64, f64), TranscriptError> {
    let bad = |reason: String| TranscriptError::Caption {
        line: line_no,
        reason,
    };
    let (start, rest) = line
        .split_once(ARROW)
        .ok_or_else(|| bad("missing `-->`".to_string()))?;
    // cue settings may follow the end time
    let end = rest
        .split_whitespace()
        .next()
        .ok_or_else(|| bad("missing end time".to_string()))?;
    let start = parse_timestamp(start).ok_or_else(|| bad(format!("bad start time {:?}", start)))?;
    let end = parse_timestamp(end).ok_or_else(|| bad(format!("bad end time {:?}", end)))?;
    if end < start {
        return Err(bad(format!("cue ends ({}) before it starts ({})", end, start)));
    }
    Ok((start, end))
}

#[derive(Debug, PartialEq)]
enum State {
    /// between blocks, or reading a cue identifier
    Idle,
    /// inside a NOTE/STYLE/REGION block
    Skipping,
    Cue,
}

/// Parse a WebVTT file, one token per cue.
pub fn parse_webvtt(content: &str) -> Result<TranscriptSequence, TranscriptError> {
    let mut cues: Vec<Cue> = Vec::new();
    let mut state = State::Idle;

    for (idx, raw) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();

        if line.is_empty() {
            state = State::Idle;
            continue;
        }

        match state {
            State::Skipping => {}
            State::Cue => {
                if line.contains(ARROW) {
                    // a cue with no blank line before it
                    let (start, end) = parse_timing_line(line, line_no)?;
                    cues.push(Cue {
                        start,
                        end,
                        lines: vec![],
                    });
                } else if let Some(cue) = cues.last_mut() {
                    cue.lines.push(line.to_string());
                }
            }
            State::Idle => {
                if idx == 0 && line.trim_start_matches('\u{feff}').starts_with("WEBVTT") {
                    state = State::Skipping;
                } else if ["NOTE", "STYLE", "REGION"]
                    .iter()
                    .any(|block| line.starts_with(block))
                {
                    state = State::Skipping;
                } else if line.contains(ARROW) {
                    let (start, end) = parse_timing_line(line, line_no)?;
                    cues.push(Cue {
                        start,
                        end,
                        lines: vec![],
                    });
                    state = State::Cue;
                } else {
                    log::trace!("skipping cue identifier {:?}", line);
                }
            }
        }
    }

    let total = cues.len();
    let tokens = cues
        .into_iter()
        .filter_map(|cue| cue_token(cue.lines.iter().map(String::as_str), cue.start, cue.end))
        .collect::<Vec<_>>();
    if tokens.len() < total {
        log::debug!("dropped {} empty WebVTT cues", total - tokens.len());
    }
    Ok(TranscriptSequence::new(tokens)?)
}

#[cfg(test)]
mod tests {
    use shorts_core::TimedToken;

    use super::*;

    const VTT: &str = "WEBVTT

NOTE produced by the transcription job

1
00:00:00.000 --> 00:00:02.500 align:start position:0%
Welcome to the show.

2
00:00:02.500 --> 00:00:05.120
<v Host>Today we talk
about serverless.

00:05.120 --> 00:07.000
- Let's go.
";

    #[test]
    fn parse_vtt_cues() {
        let seq = parse_webvtt(VTT).unwrap();
        let tokens = seq.tokens();
        assert_eq!(tokens.len(), 3);
        assert_eq!(
            tokens[0],
            TimedToken::pronunciation("Welcome to the show.", 0.0, 2.5)
        );
        assert_eq!(tokens[1].text, "Today we talk about serverless.");
        assert_eq!(tokens[1].start, 2.5);
        assert!((tokens[1].end - 5.12).abs() < 1e-9);
        assert_eq!(tokens[2].text, "Let's go.");
        assert!((tokens[2].start - 5.12).abs() < 1e-9);
    }

    #[test]
    fn timestamps() {
        assert_eq!(parse_timestamp("01:02:03.500"), Some(3723.5));
        assert_eq!(parse_timestamp("02:03,250"), Some(123.25));
        assert_eq!(parse_timestamp("00:61:00.000"), None);
        assert_eq!(parse_timestamp("00:00:75.000"), None);
        assert_eq!(parse_timestamp("12.5"), None);
        assert_eq!(parse_timestamp("aa:00:00.000"), None);
    }

    #[test]
    fn bad_timestamp_is_malformed() {
        let vtt = "WEBVTT\n\n00:00:0x.000 --> 00:00:01.000\nhi\n";
        assert!(matches!(
            parse_webvtt(vtt),
            Err(TranscriptError::Caption { line: 3, .. })
        ));
    }

    #[test]
    fn reversed_cue_is_malformed() {
        let vtt = "WEBVTT\n\n00:00:05.000 --> 00:00:01.000\nhi\n";
        assert!(parse_webvtt(vtt).is_err());
    }

    #[test]
    fn non_chronological_cues_are_malformed() {
        let vtt = "WEBVTT\n\n00:00:05.000 --> 00:00:06.000\nlater\n\n00:00:01.000 --> 00:00:02.000\nearlier\n";
        assert!(matches!(
            parse_webvtt(vtt),
            Err(TranscriptError::Sequence(_))
        ));
    }

    #[test]
    fn cue_without_blank_separator() {
        let vtt = "WEBVTT\n\n00:00.000 --> 00:01.000\none\n00:01.000 --> 00:02.000\ntwo\n";
        let seq = parse_webvtt(vtt).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.tokens()[1].text, "two");
    }

    #[test]
    fn empty_cue_is_dropped() {
        let vtt = "WEBVTT\n\n00:00.000 --> 00:01.000\n\n00:01.000 --> 00:02.000\nhi\n";
        let seq = parse_webvtt(vtt).unwrap();
        assert_eq!(seq.len(), 1);
        assert_eq!(seq.tokens()[0].start, 1.0);
    }

    #[test]
    fn empty_file() {
        assert!(parse_webvtt("").unwrap().is_empty());
        assert!(parse_webvtt("WEBVTT\n").unwrap().is_empty());
    }
}
