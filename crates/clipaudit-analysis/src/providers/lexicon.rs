//! Offline classifiers backed by the word-weight scorers. No network.

use async_trait::async_trait;

use crate::classify::TextClassifier;
use crate::error::ProviderError;
use crate::scorer::{lexicon_score, toxicity_score};
use crate::types::LabelScore;

/// Sentiment from the word lexicon.
///
/// Label is `positive`, `negative` or `neutral`; score is the magnitude of
/// the lexicon score in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconSentiment;

#[async_trait]
impl TextClassifier for LexiconSentiment {
    fn provider(&self) -> &'static str {
        "lexicon"
    }

    async fn classify(&self, text: &str) -> Result<LabelScore, ProviderError> {
        let score = lexicon_score(text);
        let label = if score < 0.0 {
            "negative"
        } else if score > 0.0 {
            "positive"
        } else {
            "neutral"
        };
        Ok(LabelScore::new(label, f64::from(score.abs())))
    }
}

/// Toxicity from the abusive-word lexicon. Score is in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconToxicity;

#[async_trait]
impl TextClassifier for LexiconToxicity {
    fn provider(&self) -> &'static str {
        "lexicon"
    }

    async fn classify(&self, text: &str) -> Result<LabelScore, ProviderError> {
        Ok(LabelScore::new("toxicity", f64::from(toxicity_score(text))))
    }
}
