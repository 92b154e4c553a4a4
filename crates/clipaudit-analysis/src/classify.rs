//! Classification adapter: wraps pluggable classifiers and normalizes their
//! output into [`ClassificationResult`]s.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ClassificationError, ProviderError};
use crate::types::{Classification, ClassificationKind, ClassificationResult, LabelScore};

/// A text classification capability.
///
/// Implementations report the provider's label and score as-is; the adapter
/// attaches the kind and provider name.
#[async_trait]
pub trait TextClassifier: Send + Sync {
    /// Short provider name used in logs and error messages.
    fn provider(&self) -> &'static str;

    async fn classify(&self, text: &str) -> Result<LabelScore, ProviderError>;
}

/// Both classifiers a job needs, injected at construction.
#[derive(Clone)]
pub struct Classifiers {
    sentiment: Arc<dyn TextClassifier>,
    harmful: Arc<dyn TextClassifier>,
}

/// Whole-transcript classification, computed once per job.
#[derive(Debug, Clone)]
pub struct DocumentAssessment {
    pub sentiment: ClassificationResult,
    pub harmful_content: ClassificationResult,
}

impl Classifiers {
    #[must_use]
    pub fn new(sentiment: Arc<dyn TextClassifier>, harmful: Arc<dyn TextClassifier>) -> Self {
        Self { sentiment, harmful }
    }

    pub async fn classify_sentiment(&self, text: &str) -> ClassificationResult {
        run(self.sentiment.as_ref(), ClassificationKind::Sentiment, text).await
    }

    pub async fn classify_harmful_content(&self, text: &str) -> ClassificationResult {
        run(self.harmful.as_ref(), ClassificationKind::HarmfulContent, text).await
    }

    /// Run both classifiers on the same text concurrently.
    pub async fn classify_both(&self, text: &str) -> (ClassificationResult, ClassificationResult) {
        tokio::join!(
            self.classify_sentiment(text),
            self.classify_harmful_content(text)
        )
    }

    /// Classify a full transcript for the document-level assessment.
    pub async fn assess(&self, transcript: &str) -> DocumentAssessment {
        let (sentiment, harmful_content) = self.classify_both(transcript).await;
        DocumentAssessment {
            sentiment,
            harmful_content,
        }
    }
}

impl std::fmt::Debug for Classifiers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifiers")
            .field("sentiment", &self.sentiment.provider())
            .field("harmful", &self.harmful.provider())
            .finish()
    }
}

async fn run(
    classifier: &dyn TextClassifier,
    kind: ClassificationKind,
    text: &str,
) -> ClassificationResult {
    let provider = classifier.provider();
    match classifier.classify(text).await {
        Ok(raw) if raw.score.is_finite() => Ok(Classification {
            kind,
            provider: provider.to_string(),
            label: raw.label,
            score: raw.score,
        }),
        Ok(raw) => Err(ClassificationError {
            kind,
            provider,
            message: format!("non-finite score for label {:?}", raw.label),
        }),
        Err(e) => Err(ClassificationError {
            kind,
            provider,
            message: e.to_string(),
        }),
    }
}
