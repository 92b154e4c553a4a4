//! Codec capabilities and the extraction operations built on them.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use clipaudit_core::VideoInfo;
use serde::{Deserialize, Serialize};

use crate::error::MediaError;

/// Raw properties read from the first video stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamProperties {
    pub width: u32,
    pub height: u32,
    pub frame_count: u64,
    pub fps: f64,
}

/// Demuxes the audio stream of a video into a standalone compressed file.
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    async fn extract_audio(&self, video: &Path, target: &Path) -> Result<(), MediaError>;
}

/// Opens a video and reads its stream properties.
#[async_trait]
pub trait VideoProbe: Send + Sync {
    async fn probe(&self, video: &Path) -> Result<StreamProperties, MediaError>;
}

/// Converts an audio file into 16 kHz mono PCM WAV for speech models.
#[async_trait]
pub trait AudioTranscoder: Send + Sync {
    async fn to_wav(&self, audio: &Path, target: &Path) -> Result<(), MediaError>;
}

/// Extract the audio track of `video` into `<stem>.mp3` beside it.
///
/// # Errors
///
/// Returns [`MediaError::Extraction`] if the extractor fails or produces no
/// file.
pub async fn extract_audio(
    extractor: &dyn AudioExtractor,
    video: &Path,
) -> Result<PathBuf, MediaError> {
    let target = video.with_extension("mp3");
    extractor.extract_audio(video, &target).await?;

    if !tokio::fs::try_exists(&target).await.unwrap_or(false) {
        return Err(MediaError::extraction(
            "audio extraction",
            format!("no audio artifact written to {}", target.display()),
        ));
    }

    tracing::info!(video = %video.display(), audio = %target.display(), "audio extracted");
    Ok(target)
}

/// Read the technical metadata of `video`.
///
/// # Errors
///
/// Returns [`MediaError::Extraction`] if the stream cannot be opened.
pub async fn extract_video_info(
    probe: &dyn VideoProbe,
    video: &Path,
) -> Result<VideoInfo, MediaError> {
    let props = probe.probe(video).await?;
    let info = VideoInfo::from_stream(props.width, props.height, props.frame_count, props.fps);
    tracing::info!(video = %video.display(), ?info, "video metadata extracted");
    Ok(info)
}
