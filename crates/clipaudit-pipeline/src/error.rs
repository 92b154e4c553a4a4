use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use clipaudit_analysis::TranscriptionError;
use clipaudit_core::JobId;
use clipaudit_media::MediaError;
use thiserror::Error;

use crate::persistence::PersistenceError;

/// Pipeline stage in which an error or degradation occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ingestion,
    Extraction,
    Transcription,
    Classification,
    Aggregation,
    Report,
    Persistence,
}

impl Stage {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ingestion => "ingestion",
            Self::Extraction => "extraction",
            Self::Transcription => "transcription",
            Self::Classification => "classification",
            Self::Aggregation => "aggregation",
            Self::Report => "report",
            Self::Persistence => "persistence",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    Timeout(Duration),
    Caller,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(d) => write!(f, "deadline of {}s exceeded", d.as_secs()),
            Self::Caller => f.write_str("cancelled by caller"),
        }
    }
}

/// Fatal-to-job failures.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid upload {filename:?}: {reason}")]
    Validation { filename: String, reason: String },

    #[error("workspace allocation failed: {0}")]
    Workspace(#[source] MediaError),

    #[error("job {job_id}: extraction failed: {source}")]
    Extraction {
        job_id: JobId,
        #[source]
        source: MediaError,
    },

    #[error("job {job_id}: transcription failed: {source}")]
    Transcription {
        job_id: JobId,
        #[source]
        source: TranscriptionError,
    },

    #[error("job {job_id}: persistence failed: {source}")]
    Persistence {
        job_id: JobId,
        #[source]
        source: PersistenceError,
    },

    #[error("job {job_id}: {reason} during {stage}")]
    Cancelled {
        job_id: JobId,
        stage: Stage,
        reason: CancelReason,
    },

    #[error("job {job_id}: {stage} failed: {message}")]
    Pipeline {
        job_id: JobId,
        stage: Stage,
        message: String,
    },
}

impl PipelineError {
    /// The job the error belongs to; `None` when no job was allocated.
    #[must_use]
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            Self::Validation { .. } | Self::Workspace(_) => None,
            Self::Extraction { job_id, .. }
            | Self::Transcription { job_id, .. }
            | Self::Persistence { job_id, .. }
            | Self::Cancelled { job_id, .. }
            | Self::Pipeline { job_id, .. } => Some(job_id),
        }
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Validation { .. } | Self::Workspace(_) => Stage::Ingestion,
            Self::Extraction { .. } => Stage::Extraction,
            Self::Transcription { .. } => Stage::Transcription,
            Self::Persistence { .. } => Stage::Persistence,
            Self::Cancelled { stage, .. } | Self::Pipeline { stage, .. } => *stage,
        }
    }

    pub(crate) fn from_ingest(job_id: &JobId, err: MediaError) -> Self {
        match err {
            MediaError::Validation { filename, reason } => Self::Validation { filename, reason },
            MediaError::Workspace { .. } => Self::Workspace(err),
            other => Self::Pipeline {
                job_id: job_id.clone(),
                stage: Stage::Ingestion,
                message: other.to_string(),
            },
        }
    }
}

/// A non-fatal problem: the job continued with a reduced result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Degradation {
    /// Video metadata could not be read; `videoInfo` is absent.
    VideoInfoUnavailable { message: String },
    /// Segments whose classification failed and produced no issues.
    ClassificationFailures { count: usize },
    /// Whole-transcript classification failed.
    DocumentAssessmentFailed { message: String },
    SummaryWriteFailed { path: PathBuf, message: String },
    MetadataExportFailed { path: PathBuf, message: String },
    /// Object-storage upload failed; `audioUrl` is null.
    ArtifactUploadFailed { message: String },
    UploadCleanupFailed { path: PathBuf, message: String },
}

impl Degradation {
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::VideoInfoUnavailable { .. } => Stage::Extraction,
            Self::ClassificationFailures { .. } | Self::DocumentAssessmentFailed { .. } => {
                Stage::Classification
            }
            Self::SummaryWriteFailed { .. } | Self::MetadataExportFailed { .. } => Stage::Report,
            Self::ArtifactUploadFailed { .. } | Self::UploadCleanupFailed { .. } => {
                Stage::Persistence
            }
        }
    }
}

impl fmt::Display for Degradation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VideoInfoUnavailable { message } => {
                write!(f, "video metadata unavailable: {message}")
            }
            Self::ClassificationFailures { count } => {
                write!(f, "{count} segment(s) could not be classified")
            }
            Self::DocumentAssessmentFailed { message } => {
                write!(f, "transcript assessment failed: {message}")
            }
            Self::SummaryWriteFailed { path, message } => {
                write!(f, "summary {} not written: {message}", path.display())
            }
            Self::MetadataExportFailed { path, message } => {
                write!(f, "metadata export {} not written: {message}", path.display())
            }
            Self::ArtifactUploadFailed { message } => {
                write!(f, "audio upload failed: {message}")
            }
            Self::UploadCleanupFailed { path, message } => {
                write!(f, "could not remove upload {}: {message}", path.display())
            }
        }
    }
}
