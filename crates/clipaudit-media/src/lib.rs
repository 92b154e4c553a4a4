//! Job workspaces, upload ingestion and codec tooling for clipaudit.
//!
//! The codec-facing operations are expressed as capability traits
//! ([`AudioExtractor`], [`VideoProbe`], [`AudioTranscoder`]) so the pipeline
//! can run against the real `ffmpeg`/`ffprobe` binaries ([`Ffmpeg`]) or
//! against test doubles.

pub mod error;
pub mod extract;
pub mod ffmpeg;
pub mod ingest;
pub mod workspace;

pub use error::MediaError;
pub use extract::{
    extract_audio, extract_video_info, AudioExtractor, AudioTranscoder, StreamProperties,
    VideoProbe,
};
pub use ffmpeg::Ffmpeg;
pub use ingest::{ingest, ingest_file, validate_filename, ALLOWED_EXTENSIONS};
pub use workspace::WorkspaceManager;
