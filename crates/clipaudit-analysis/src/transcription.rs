//! Transcription adapter.
//!
//! Audio is converted to 16 kHz mono WAV beside the input, handed to the
//! speech capability, and the intermediate file is removed on every exit
//! path, including cancellation of the awaiting future.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use clipaudit_core::TranscriptSegment;
use clipaudit_media::AudioTranscoder;

use crate::error::TranscriptionError;

/// One segment as reported by a speech model, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedSegment {
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// A speech-recognition capability operating on WAV input.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    fn provider(&self) -> &'static str;

    async fn transcribe_text(&self, wav: &Path) -> Result<String, TranscriptionError>;

    async fn transcribe_segments(
        &self,
        wav: &Path,
    ) -> Result<Vec<RecognizedSegment>, TranscriptionError>;
}

/// Deletes the intermediate WAV when dropped.
struct IntermediateWav {
    path: PathBuf,
}

impl IntermediateWav {
    fn beside(audio: &Path) -> Self {
        let stem = audio
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("audio");
        Self {
            path: audio.with_file_name(format!("{stem}_16k.wav")),
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for IntermediateWav {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "intermediate audio removed"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "failed to remove intermediate audio"
            ),
        }
    }
}

/// Converts audio and runs the speech capability on it.
#[derive(Clone)]
pub struct Transcriber {
    speech: Arc<dyn SpeechToText>,
    transcoder: Arc<dyn AudioTranscoder>,
}

impl Transcriber {
    #[must_use]
    pub fn new(speech: Arc<dyn SpeechToText>, transcoder: Arc<dyn AudioTranscoder>) -> Self {
        Self { speech, transcoder }
    }

    #[must_use]
    pub fn provider(&self) -> &'static str {
        self.speech.provider()
    }

    /// Transcribe `audio` into one flat string.
    ///
    /// # Errors
    ///
    /// Returns [`TranscriptionError::Conversion`] if the WAV conversion fails,
    /// the provider's error if recognition fails, or
    /// [`TranscriptionError::Empty`] if no text was recognized.
    pub async fn transcribe(&self, audio: &Path) -> Result<String, TranscriptionError> {
        let wav = IntermediateWav::beside(audio);
        self.transcoder.to_wav(audio, wav.path()).await?;

        let text = self.speech.transcribe_text(wav.path()).await?;
        let text = text.trim();
        if text.is_empty() {
            return Err(TranscriptionError::Empty);
        }

        tracing::info!(
            audio = %audio.display(),
            provider = self.speech.provider(),
            chars = text.len(),
            "transcription complete"
        );
        Ok(text.to_string())
    }

    /// Transcribe `audio` into segments ordered by start time.
    ///
    /// Segments whose bounds are not finite or whose end does not follow
    /// their start are dropped with a warning.
    ///
    /// # Errors
    ///
    /// Same as [`Transcriber::transcribe`]; [`TranscriptionError::Empty`] when
    /// no valid segment carries any text.
    pub async fn transcribe_with_timestamps(
        &self,
        audio: &Path,
    ) -> Result<Vec<TranscriptSegment>, TranscriptionError> {
        let wav = IntermediateWav::beside(audio);
        self.transcoder.to_wav(audio, wav.path()).await?;

        let raw = self.speech.transcribe_segments(wav.path()).await?;
        let segments = normalize_segments(raw);
        if segments.iter().all(|s| s.text.trim().is_empty()) {
            return Err(TranscriptionError::Empty);
        }

        tracing::info!(
            audio = %audio.display(),
            provider = self.speech.provider(),
            segments = segments.len(),
            "timestamped transcription complete"
        );
        Ok(segments)
    }
}

impl std::fmt::Debug for Transcriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transcriber")
            .field("speech", &self.speech.provider())
            .finish_non_exhaustive()
    }
}

/// Validate, trim and order raw segments.
pub(crate) fn normalize_segments(raw: Vec<RecognizedSegment>) -> Vec<TranscriptSegment> {
    let mut segments: Vec<TranscriptSegment> = raw
        .into_iter()
        .enumerate()
        .filter_map(|(index, seg)| {
            let valid = TranscriptSegment::new(seg.start, seg.end, seg.text.trim());
            if valid.is_none() {
                tracing::warn!(
                    index,
                    start = seg.start,
                    end = seg.end,
                    "dropping transcript segment with invalid bounds"
                );
            }
            valid
        })
        .collect();
    segments.sort_by(|a, b| a.start_seconds.total_cmp(&b.start_seconds));
    segments
}

/// Join segment texts into the flat transcript.
#[must_use]
pub fn join_segments(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f64, end: f64, text: &str) -> RecognizedSegment {
        RecognizedSegment {
            start,
            end,
            text: text.to_string(),
        }
    }

    #[test]
    fn normalize_sorts_and_drops_invalid_segments() {
        let out = normalize_segments(vec![
            seg(6.0, 8.0, " second "),
            seg(3.0, 3.0, "zero length"),
            seg(2.0, 4.0, "first"),
            seg(f64::NAN, 1.0, "nan"),
        ]);

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text, "first");
        assert_eq!(out[1].text, "second");
        assert!(out[0].start_seconds <= out[1].start_seconds);
    }

    #[test]
    fn join_skips_empty_text() {
        let segments = normalize_segments(vec![
            seg(0.0, 1.0, "hello"),
            seg(1.0, 2.0, "  "),
            seg(2.0, 3.0, "world"),
        ]);
        assert_eq!(join_segments(&segments), "hello world");
    }

    #[test]
    fn intermediate_name_never_collides_with_wav_input() {
        let wav = IntermediateWav::beside(Path::new("/w/abc.wav"));
        assert_eq!(wav.path(), Path::new("/w/abc_16k.wav"));
    }
}
