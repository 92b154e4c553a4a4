//! Technical video properties and transcript segments.

use serde::{Deserialize, Serialize};

/// Technical properties of the source video stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub frame_count: u64,
    /// Frames per second, rounded to 2 decimals.
    pub fps: f64,
    /// `frame_count / fps / 60`, rounded to 2 decimals; `0.0` when fps is zero.
    pub duration_minutes: f64,
}

impl VideoInfo {
    /// Builds a `VideoInfo` from raw stream properties.
    ///
    /// Duration is computed from the unrounded frame rate; only the stored
    /// `fps` is rounded.
    #[must_use]
    pub fn from_stream(width: u32, height: u32, frame_count: u64, raw_fps: f64) -> Self {
        Self {
            width,
            height,
            frame_count,
            fps: round2(raw_fps),
            duration_minutes: duration_minutes(frame_count, raw_fps),
        }
    }
}

/// Duration in minutes, rounded to 2 decimals. Never divides by zero.
#[must_use]
pub fn duration_minutes(frame_count: u64, fps: f64) -> f64 {
    if !fps.is_finite() || fps <= 0.0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let seconds = frame_count as f64 / fps;
    round2(seconds / 60.0)
}

fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    (value * 100.0).round() / 100.0
}

/// A time-bounded slice of transcript text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptSegment {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub text: String,
}

impl TranscriptSegment {
    /// Returns `None` unless `end > start` and both bounds are finite.
    #[must_use]
    pub fn new(start_seconds: f64, end_seconds: f64, text: impl Into<String>) -> Option<Self> {
        if !start_seconds.is_finite() || !end_seconds.is_finite() || end_seconds <= start_seconds {
            return None;
        }
        Some(Self {
            start_seconds,
            end_seconds,
            text: text.into(),
        })
    }
}
