//! Timestamped findings surfaced to callers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::media::TranscriptSegment;

/// Harmful-content scores strictly above this value raise a toxic content issue.
pub const TOXICITY_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssueCategory {
    #[serde(rename = "toxic content")]
    ToxicContent,
    #[serde(rename = "negative sentiment")]
    NegativeSentiment,
}

impl IssueCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            IssueCategory::ToxicContent => "toxic content",
            IssueCategory::NegativeSentiment => "negative sentiment",
        }
    }
}

impl fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flagged finding anchored to the start of the segment that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// `HH:MM:SS`, see [`format_timestamp`].
    pub timestamp: String,
    pub category: IssueCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl Issue {
    #[must_use]
    pub fn at(segment: &TranscriptSegment, category: IssueCategory, score: Option<f64>) -> Self {
        Self {
            timestamp: format_timestamp(segment.start_seconds),
            category,
            score,
        }
    }
}

/// Formats seconds as `HH:MM:SS`.
///
/// Fractional seconds are truncated, never rounded, so `59.999` is
/// `00:00:59`. Negative and non-finite inputs format as `00:00:00`.
#[must_use]
pub fn format_timestamp(seconds: f64) -> String {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.trunc() as u64
    } else {
        0
    };
    let (minutes, secs) = (total / 60, total % 60);
    let (hours, minutes) = (minutes / 60, minutes % 60);
    format!("{hours:02}:{minutes:02}:{secs:02}")
}
