//! Frame accurate `HH:MM:SS:FF` timecodes for the renderer.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub const DEFAULT_FRAME_RATE: u32 = 25;

// inputs are snapped to whole microseconds before flooring to a frame,
// so `0.2 * 25` stays on frame 5 and nothing under a frame rounds up
const MICROS_PER_SECOND: u64 = 1_000_000;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TimecodeError {
    #[error("timecode {0:?} is not in HH:MM:SS:FF form")]
    Format(String),
    #[error("timecode {0:?} has a field out of range")]
    OutOfRange(String),
    #[error("frame rate must be greater than zero")]
    ZeroFrameRate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timecode {
    pub hours: u64,
    pub minutes: u8,
    pub seconds: u8,
    pub frames: u32,
}

impl Timecode {
    /// Convert seconds to a timecode, rounding the fraction down to a whole frame.
    ///
    /// Negative and non-finite inputs clamp to zero.
    pub fn from_seconds(seconds: f64, frame_rate: u32) -> Timecode {
        let frame_rate = frame_rate.max(1) as u64;
        let seconds = if seconds.is_finite() && seconds > 0.0 {
            seconds
        } else {
            if seconds != 0.0 {
                log::warn!("clamping invalid timecode input {} to zero", seconds);
            }
            0.0
        };
        let micros = (seconds * MICROS_PER_SECOND as f64).round() as u64;
        let total_frames = (micros as u128 * frame_rate as u128 / MICROS_PER_SECOND as u128) as u64;
        let frames = total_frames % frame_rate;
        let whole = total_frames / frame_rate;
        Timecode {
            hours: whole / 3600,
            minutes: ((whole % 3600) / 60) as u8,
            seconds: (whole % 60) as u8,
            frames: frames as u32,
        }
    }

    pub fn parse(s: &str, frame_rate: u32) -> Result<Timecode, TimecodeError> {
        if frame_rate == 0 {
            return Err(TimecodeError::ZeroFrameRate);
        }
        let tc = Timecode::from_str(s)?;
        if tc.frames >= frame_rate {
            return Err(TimecodeError::OutOfRange(s.to_string()));
        }
        Ok(tc)
    }

    pub fn as_seconds(&self, frame_rate: u32) -> f64 {
        let whole = self.hours * 3600 + self.minutes as u64 * 60 + self.seconds as u64;
        whole as f64 + self.frames as f64 / frame_rate.max(1) as f64
    }
}

/// Parses the field layout only, the frame count is checked by [`Timecode::parse`].
impl FromStr for Timecode {
    type Err = TimecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields = s
            .trim()
            .split(':')
            .map(|f| f.parse::<u64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| TimecodeError::Format(s.to_string()))?;
        let (hours, minutes, seconds, frames) = match fields.as_slice() {
            [h, m, sec, ff] => (*h, *m, *sec, *ff),
            _ => return Err(TimecodeError::Format(s.to_string())),
        };
        if minutes >= 60 || seconds >= 60 || frames > u32::MAX as u64 {
            return Err(TimecodeError::OutOfRange(s.to_string()));
        }
        Ok(Timecode {
            hours,
            minutes: minutes as u8,
            seconds: seconds as u8,
            frames: frames as u32,
        })
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}:{:02}:{:02}",
            self.hours, self.minutes, self.seconds, self.frames
        )
    }
}

pub fn format_timecode(seconds: f64, frame_rate: u32) -> String {
    Timecode::from_seconds(seconds, frame_rate).to_string()
}

pub fn parse_timecode(s: &str, frame_rate: u32) -> Result<f64, TimecodeError> {
    Ok(Timecode::parse(s, frame_rate)?.as_seconds(frame_rate))
}

/// Milliseconds between two timecodes as the renderer will cut them.
pub fn duration_ms(start: &Timecode, end: &Timecode, frame_rate: u32) -> i64 {
    let delta = end.as_seconds(frame_rate) - start.as_seconds(frame_rate);
    (delta * 1000.0).round() as i64
}

/// A start/end pair in the shape the rendering templates consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimecodeRange {
    #[serde(rename = "StartTimecode")]
    pub start: String,
    #[serde(rename = "EndTimecode")]
    pub end: String,
}

impl TimecodeRange {
    pub fn from_seconds(start: f64, end: f64, frame_rate: u32) -> TimecodeRange {
        TimecodeRange {
            start: format_timecode(start, frame_rate),
            end: format_timecode(end, frame_rate),
        }
    }
}
