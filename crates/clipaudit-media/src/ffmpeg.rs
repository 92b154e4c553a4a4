//! `ffmpeg`/`ffprobe` subprocess capability.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

use crate::error::MediaError;
use crate::extract::{AudioExtractor, AudioTranscoder, StreamProperties, VideoProbe};

/// Bytes of stderr kept in error messages.
const STDERR_TAIL: usize = 2048;

/// Runs the external `ffmpeg` and `ffprobe` binaries.
///
/// Child processes are killed if the awaiting future is dropped, so a
/// cancelled job never leaves an encoder running.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    ffmpeg_path: String,
    ffprobe_path: String,
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl Ffmpeg {
    #[must_use]
    pub fn new(ffmpeg_path: impl Into<String>, ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            ffprobe_path: ffprobe_path.into(),
        }
    }
}

async fn run(
    mut command: Command,
    program: &str,
    stage: &'static str,
) -> Result<Vec<u8>, MediaError> {
    let output = command
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            MediaError::extraction(stage, format!("failed to execute {program}: {e}"))
        })?;

    if !output.status.success() {
        return Err(MediaError::extraction(
            stage,
            format!(
                "{program} exited with {}: {}",
                output.status,
                stderr_tail(&output.stderr)
            ),
        ));
    }

    Ok(output.stdout)
}

#[async_trait]
impl AudioExtractor for Ffmpeg {
    async fn extract_audio(&self, video: &Path, target: &Path) -> Result<(), MediaError> {
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
            .arg(video)
            .args(["-vn", "-acodec", "libmp3lame", "-q:a", "2"])
            .arg(target);
        run(cmd, &self.ffmpeg_path, "audio extraction").await?;
        Ok(())
    }
}

#[async_trait]
impl AudioTranscoder for Ffmpeg {
    async fn to_wav(&self, audio: &Path, target: &Path) -> Result<(), MediaError> {
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
            .arg(audio)
            .args(["-ac", "1", "-ar", "16000", "-c:a", "pcm_s16le", "-f", "wav"])
            .arg(target);
        run(cmd, &self.ffmpeg_path, "audio conversion").await?;
        Ok(())
    }
}

#[async_trait]
impl VideoProbe for Ffmpeg {
    async fn probe(&self, video: &Path) -> Result<StreamProperties, MediaError> {
        let mut cmd = Command::new(&self.ffprobe_path);
        cmd.args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height,nb_frames,avg_frame_rate,r_frame_rate,duration:format=duration",
            "-of",
            "json",
        ])
        .arg(video);
        let stdout = run(cmd, &self.ffprobe_path, "video probe").await?;
        parse_probe_output(&stdout)
    }
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
    nb_frames: Option<String>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Parse `ffprobe -of json` output for the first video stream.
///
/// Frame count comes from `nb_frames` when the container records it, and is
/// otherwise estimated from duration and frame rate.
pub(crate) fn parse_probe_output(stdout: &[u8]) -> Result<StreamProperties, MediaError> {
    let parsed: ProbeOutput = serde_json::from_slice(stdout).map_err(|e| {
        MediaError::extraction("video probe", format!("unparseable ffprobe output: {e}"))
    })?;

    let stream = parsed
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| MediaError::extraction("video probe", "no video stream found"))?;

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .map(parse_framerate)
        .filter(|f| *f > 0.0)
        .or_else(|| stream.r_frame_rate.as_deref().map(parse_framerate))
        .unwrap_or(0.0);

    let duration = stream
        .duration
        .as_deref()
        .or(parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    let frame_count = match stream.nb_frames.as_deref().and_then(|n| n.parse::<u64>().ok()) {
        Some(n) => n,
        None => estimate_frames(duration, fps),
    };

    Ok(StreamProperties {
        width: stream.width.unwrap_or(0),
        height: stream.height.unwrap_or(0),
        frame_count,
        fps,
    })
}

/// Parse an ffprobe rate such as `"30000/1001"` or `"30"`.
fn parse_framerate(rate: &str) -> f64 {
    if let Some((num, den)) = rate.split_once('/') {
        let num: f64 = num.trim().parse().unwrap_or(0.0);
        let den: f64 = den.trim().parse().unwrap_or(0.0);
        if den == 0.0 {
            return 0.0;
        }
        return num / den;
    }
    rate.trim().parse().unwrap_or(0.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn estimate_frames(duration_secs: f64, fps: f64) -> u64 {
    let frames = (duration_secs * fps).round();
    if frames.is_finite() && frames > 0.0 {
        frames as u64
    } else {
        0
    }
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    if text.len() <= STDERR_TAIL {
        return text.to_string();
    }
    let mut start = text.len() - STDERR_TAIL;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    format!("...{}", &text[start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_framerate_handles_fractions_and_zero_denominator() {
        assert!((parse_framerate("30000/1001") - 29.970_029_97).abs() < 1e-6);
        assert!((parse_framerate("30") - 30.0).abs() < f64::EPSILON);
        assert_eq!(parse_framerate("0/0"), 0.0);
        assert_eq!(parse_framerate("garbage"), 0.0);
    }

    #[test]
    fn parse_probe_output_prefers_nb_frames() {
        let json = br#"{
            "streams": [{
                "width": 320, "height": 240, "nb_frames": "300",
                "avg_frame_rate": "30/1", "r_frame_rate": "30/1", "duration": "10.000000"
            }],
            "format": {"duration": "10.000000"}
        }"#;
        let props = parse_probe_output(json).unwrap();
        assert_eq!(props.width, 320);
        assert_eq!(props.height, 240);
        assert_eq!(props.frame_count, 300);
        assert!((props.fps - 30.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_probe_output_estimates_frames_without_nb_frames() {
        let json = br#"{
            "streams": [{"width": 640, "height": 360, "avg_frame_rate": "0/0", "r_frame_rate": "25/1"}],
            "format": {"duration": "4.0"}
        }"#;
        let props = parse_probe_output(json).unwrap();
        assert!((props.fps - 25.0).abs() < f64::EPSILON);
        assert_eq!(props.frame_count, 100);
    }

    #[test]
    fn parse_probe_output_without_video_stream_is_extraction_error() {
        let err = parse_probe_output(br#"{"streams": []}"#).unwrap_err();
        assert!(matches!(err, MediaError::Extraction { stage: "video probe", .. }));
        assert!(parse_probe_output(b"not json").is_err());
    }

    #[test]
    fn stderr_tail_keeps_the_end() {
        let long = "x".repeat(STDERR_TAIL + 10) + "END";
        let tail = stderr_tail(long.as_bytes());
        assert!(tail.starts_with("..."));
        assert!(tail.ends_with("END"));
    }
}
