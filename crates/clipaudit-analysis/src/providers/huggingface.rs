//! Hugging Face Inference API text-classification provider.
//!
//! `POST {base}/models/{model}` with `{"inputs": text}`. The API answers with
//! either `[[{label, score}, ...]]` or a flat `[{label, score}, ...]`.
//!
//! Score semantics depend on the mode: [`HuggingFaceMode::TopLabel`] returns
//! the highest-scoring label and its probability (sentiment models such as
//! SST-2 emit `POSITIVE`/`NEGATIVE`), while [`HuggingFaceMode::TargetLabel`]
//! returns the probability of one named label (`toxic` for `unitary/toxic-bert`).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::classify::TextClassifier;
use crate::error::{error_body, ProviderError};
use crate::http::normalize_base_url;
use crate::types::LabelScore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HuggingFaceMode {
    /// Report the label with the highest score.
    TopLabel,
    /// Report the score of this label, whatever its rank.
    TargetLabel(String),
}

pub struct HuggingFaceClassifier {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    mode: HuggingFaceMode,
}

#[derive(Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceResponse {
    fn into_labels(self) -> Vec<LabelScore> {
        match self {
            Self::Nested(mut outer) => {
                if outer.is_empty() {
                    Vec::new()
                } else {
                    outer.swap_remove(0)
                }
            }
            Self::Flat(labels) => labels,
        }
    }
}

impl HuggingFaceClassifier {
    #[must_use]
    pub fn new(
        client: Client,
        base_url: &str,
        model: &str,
        api_key: Option<String>,
        mode: HuggingFaceMode,
    ) -> Self {
        Self {
            client,
            endpoint: format!("{}/models/{model}", normalize_base_url(base_url)),
            api_key,
            mode,
        }
    }

    /// Sentiment model: the top label, lowercased by the caller's matcher.
    #[must_use]
    pub fn sentiment(client: Client, base_url: &str, model: &str, api_key: Option<String>) -> Self {
        Self::new(client, base_url, model, api_key, HuggingFaceMode::TopLabel)
    }

    /// Toxicity model: the probability of the `toxic` label.
    #[must_use]
    pub fn toxicity(client: Client, base_url: &str, model: &str, api_key: Option<String>) -> Self {
        Self::new(
            client,
            base_url,
            model,
            api_key,
            HuggingFaceMode::TargetLabel("toxic".to_string()),
        )
    }

    fn pick(&self, labels: Vec<LabelScore>) -> Result<LabelScore, ProviderError> {
        match &self.mode {
            HuggingFaceMode::TopLabel => labels
                .into_iter()
                .max_by(|a, b| a.score.total_cmp(&b.score))
                .ok_or_else(|| ProviderError::Malformed("empty label list".to_string())),
            HuggingFaceMode::TargetLabel(target) => labels
                .into_iter()
                .find(|l| l.label.eq_ignore_ascii_case(target))
                .ok_or_else(|| ProviderError::Malformed(format!("label {target:?} missing"))),
        }
    }
}

#[async_trait]
impl TextClassifier for HuggingFaceClassifier {
    fn provider(&self) -> &'static str {
        "huggingface"
    }

    async fn classify(&self, text: &str) -> Result<LabelScore, ProviderError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&InferenceRequest { inputs: text });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status {
                status: response.status().as_u16(),
                body: error_body(response).await,
            });
        }

        let parsed: InferenceResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        self.pick(parsed.into_labels())
    }
}
