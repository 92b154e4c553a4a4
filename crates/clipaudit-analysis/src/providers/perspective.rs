//! Google Perspective API harmful-content provider.
//!
//! Score is the `TOXICITY` summary probability in `[0.0, 1.0]`. The key
//! travels in the `x-goog-api-key` header, never in the URL.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::classify::TextClassifier;
use crate::error::{error_body, ProviderError};
use crate::http::normalize_base_url;
use crate::types::LabelScore;

pub struct PerspectiveClassifier {
    client: Client,
    endpoint: String,
    api_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeResponse {
    attribute_scores: Option<AttributeScores>,
}

#[derive(Deserialize)]
struct AttributeScores {
    #[serde(rename = "TOXICITY")]
    toxicity: Option<AttributeScore>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AttributeScore {
    summary_score: SummaryScore,
}

#[derive(Deserialize)]
struct SummaryScore {
    value: f64,
}

impl PerspectiveClassifier {
    #[must_use]
    pub fn new(client: Client, base_url: &str, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: format!("{}/v1alpha1/comments:analyze", normalize_base_url(base_url)),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl TextClassifier for PerspectiveClassifier {
    fn provider(&self) -> &'static str {
        "perspective"
    }

    async fn classify(&self, text: &str) -> Result<LabelScore, ProviderError> {
        let body = json!({
            "comment": { "text": text },
            "languages": ["en"],
            "requestedAttributes": { "TOXICITY": {} },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ProviderError::Status {
                status: response.status().as_u16(),
                body: error_body(response).await,
            });
        }

        let parsed: AnalyzeResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;
        let score = parsed
            .attribute_scores
            .and_then(|a| a.toxicity)
            .map(|t| t.summary_score.value)
            .ok_or_else(|| ProviderError::Malformed("attributeScores.TOXICITY missing".to_string()))?;

        Ok(LabelScore::new("toxicity", score))
    }
}
