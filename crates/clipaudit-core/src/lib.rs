//! Shared domain model and configuration for clipaudit.
//!
//! Everything here is synchronous and I/O free apart from reading the
//! process environment in [`load_app_config`].

pub mod app_config;
pub mod config;
pub mod issues;
pub mod job;
pub mod media;
pub mod record;

use thiserror::Error;

pub use app_config::{
    AppConfig, Environment, HarmfulProvider, ObjectStoreConfig, SentimentProvider, UploadCleanup,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use issues::{format_timestamp, Issue, IssueCategory, TOXICITY_THRESHOLD};
pub use job::{Job, JobId, JobStatus};
pub use media::{duration_minutes, TranscriptSegment, VideoInfo};
pub use record::{iso_timestamp, AnalysisRecord};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required env var: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid job id: {0:?}")]
    InvalidJobId(String),
}
