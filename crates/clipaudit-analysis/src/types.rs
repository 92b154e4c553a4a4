use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ClassificationError;

/// Which capability produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClassificationKind {
    Sentiment,
    HarmfulContent,
}

impl ClassificationKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sentiment => "sentiment",
            Self::HarmfulContent => "harmful content",
        }
    }
}

impl fmt::Display for ClassificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw provider output: a label and the score the provider gave it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

impl LabelScore {
    #[must_use]
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// A normalized classification of one piece of text.
///
/// `score` is passed through from the provider unmodified. For sentiment it
/// is the confidence in `label`; for harmful content it is the toxicity
/// probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub kind: ClassificationKind,
    pub provider: String,
    pub label: String,
    pub score: f64,
}

impl Classification {
    /// Whether this is a sentiment classification labelled negative.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.kind == ClassificationKind::Sentiment && self.label.eq_ignore_ascii_case("negative")
    }
}

pub type ClassificationResult = Result<Classification, ClassificationError>;
