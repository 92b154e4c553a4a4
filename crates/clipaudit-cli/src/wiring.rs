//! Constructs every collaborator once from the loaded config.

use std::sync::Arc;
use std::time::Duration;

use clipaudit_analysis::providers::{
    HuggingFaceClassifier, LexiconSentiment, LexiconToxicity, PerspectiveClassifier, WhisperHttp,
};
use clipaudit_analysis::{build_http_client, Classifiers, TextClassifier, Transcriber};
use clipaudit_core::{AppConfig, HarmfulProvider, SentimentProvider};
use clipaudit_db::DEFAULT_COLLECTION;
use clipaudit_media::{Ffmpeg, WorkspaceManager};
use clipaudit_pipeline::{
    Collaborators, MemoryRecordStore, ObjectStore, PgRecordStore, Pipeline, PipelineSettings,
    RecordStore, S3ObjectStore,
};

pub(crate) fn pg_store(pool: sqlx::PgPool) -> Arc<dyn RecordStore> {
    Arc::new(PgRecordStore::new(pool, DEFAULT_COLLECTION))
}

pub(crate) fn memory_store() -> Arc<dyn RecordStore> {
    Arc::new(MemoryRecordStore::new())
}

fn ffmpeg(config: &AppConfig) -> Arc<Ffmpeg> {
    Arc::new(Ffmpeg::new(&config.ffmpeg_path, &config.ffprobe_path))
}

fn transcriber_with(
    config: &AppConfig,
    client: reqwest::Client,
    ffmpeg: Arc<Ffmpeg>,
) -> Transcriber {
    let speech = WhisperHttp::new(
        client,
        &config.transcription_url,
        &config.transcription_model,
        config.transcription_api_key.clone(),
    );
    Transcriber::new(Arc::new(speech), ffmpeg)
}

/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub(crate) fn build_transcriber(config: &AppConfig) -> anyhow::Result<Transcriber> {
    let client = build_http_client(config.http_timeout_secs)?;
    Ok(transcriber_with(config, client, ffmpeg(config)))
}

/// Select the configured classification providers.
///
/// # Errors
///
/// Returns an error if the Perspective provider is selected without a key.
pub(crate) fn build_classifiers(
    config: &AppConfig,
    client: &reqwest::Client,
) -> anyhow::Result<Classifiers> {
    let sentiment: Arc<dyn TextClassifier> = match config.sentiment_provider {
        SentimentProvider::Lexicon => Arc::new(LexiconSentiment),
        SentimentProvider::HuggingFace => Arc::new(HuggingFaceClassifier::sentiment(
            client.clone(),
            &config.hf_url,
            &config.hf_sentiment_model,
            config.hf_api_key.clone(),
        )),
    };

    let harmful: Arc<dyn TextClassifier> = match config.harmful_provider {
        HarmfulProvider::Lexicon => Arc::new(LexiconToxicity),
        HarmfulProvider::HuggingFace => Arc::new(HuggingFaceClassifier::toxicity(
            client.clone(),
            &config.hf_url,
            &config.hf_toxicity_model,
            config.hf_api_key.clone(),
        )),
        HarmfulProvider::Perspective => {
            let key = config
                .perspective_api_key
                .clone()
                .ok_or_else(|| anyhow::anyhow!("CLIPAUDIT_PERSPECTIVE_API_KEY is not set"))?;
            Arc::new(PerspectiveClassifier::new(
                client.clone(),
                &config.perspective_url,
                key,
            ))
        }
    };

    tracing::debug!(
        sentiment = sentiment.provider(),
        harmful = harmful.provider(),
        "classifiers selected"
    );
    Ok(Classifiers::new(sentiment, harmful))
}

/// Build the pipeline with the given record store.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or a provider is
/// misconfigured.
pub(crate) fn build_pipeline(
    config: &AppConfig,
    records: Arc<dyn RecordStore>,
) -> anyhow::Result<Pipeline> {
    let client = build_http_client(config.http_timeout_secs)?;
    let ffmpeg = ffmpeg(config);

    let objects = config
        .object_store
        .as_ref()
        .map(|store| Arc::new(S3ObjectStore::new(store)) as Arc<dyn ObjectStore>);

    let collaborators = Collaborators {
        workspaces: WorkspaceManager::new(&config.workspace_root),
        extractor: ffmpeg.clone(),
        probe: ffmpeg.clone(),
        transcriber: transcriber_with(config, client.clone(), ffmpeg),
        classifiers: build_classifiers(config, &client)?,
        records,
        objects,
    };

    let settings = PipelineSettings {
        classify_concurrency: config.classify_concurrency,
        job_timeout: config.job_timeout_secs.map(Duration::from_secs),
        upload_cleanup: config.upload_cleanup,
    };

    Ok(Pipeline::new(collaborators, settings))
}
