//! Whisper-compatible HTTP speech provider.
//!
//! Targets the OpenAI-style `POST {base}/v1/audio/transcriptions` multipart
//! endpoint, which self-hosted Whisper servers also expose. Timestamped
//! transcription requests `response_format=verbose_json` and reads
//! `segments[].{start,end,text}`.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;

use crate::error::{error_body, TranscriptionError};
use crate::http::normalize_base_url;
use crate::transcription::{RecognizedSegment, SpeechToText};

pub struct WhisperHttp {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Deserialize)]
struct TextResponse {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct VerboseResponse {
    #[serde(default)]
    segments: Vec<VerboseSegment>,
}

#[derive(Deserialize)]
struct VerboseSegment {
    start: f64,
    end: f64,
    #[serde(default)]
    text: String,
}

impl WhisperHttp {
    #[must_use]
    pub fn new(
        client: Client,
        base_url: &str,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: format!("{}/v1/audio/transcriptions", normalize_base_url(base_url)),
            model: model.into(),
            api_key,
        }
    }

    async fn post(
        &self,
        wav: &Path,
        response_format: &'static str,
    ) -> Result<reqwest::Response, TranscriptionError> {
        let bytes = tokio::fs::read(wav)
            .await
            .map_err(|source| TranscriptionError::Io {
                path: wav.to_path_buf(),
                source,
            })?;
        let file_name = wav
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/wav")?;
        let form = Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("response_format", response_format);

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(TranscriptionError::Status {
                status: response.status().as_u16(),
                body: error_body(response).await,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl SpeechToText for WhisperHttp {
    fn provider(&self) -> &'static str {
        "whisper-http"
    }

    async fn transcribe_text(&self, wav: &Path) -> Result<String, TranscriptionError> {
        let parsed: TextResponse = self
            .post(wav, "json")
            .await?
            .json()
            .await
            .map_err(|e| TranscriptionError::Malformed(e.to_string()))?;
        Ok(parsed.text)
    }

    async fn transcribe_segments(
        &self,
        wav: &Path,
    ) -> Result<Vec<RecognizedSegment>, TranscriptionError> {
        let parsed: VerboseResponse = self
            .post(wav, "verbose_json")
            .await?
            .json()
            .await
            .map_err(|e| TranscriptionError::Malformed(e.to_string()))?;

        Ok(parsed
            .segments
            .into_iter()
            .map(|s| RecognizedSegment {
                start: s.start,
                end: s.end,
                text: s.text,
            })
            .collect())
    }
}
