use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::CoreError;

/// Opaque, time-ordered job identifier.
///
/// Backed by a UUIDv7 rendered as 32 lowercase hex characters: the leading
/// 48 bits are the Unix timestamp in milliseconds and the remainder is a
/// counter plus random disambiguator, so identifiers sort by creation time and
/// stay distinct when many are minted within the same millisecond.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().simple().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for JobId {
    type Err = CoreError;

    /// Parses a job id supplied from outside (CLI argument, stored record).
    ///
    /// Only ASCII alphanumerics are accepted so an id can always be used as a
    /// single path component.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || s.len() > 64 || !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(CoreError::InvalidJobId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One analysis run and the workspace directory allocated to it.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: JobId,
    pub workspace_path: PathBuf,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    #[must_use]
    pub fn new(id: JobId, workspace_path: PathBuf) -> Self {
        Self {
            id,
            workspace_path,
            status: JobStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Path of a workspace artifact named `<id><suffix>`, e.g. `.mp4` or `_summary.txt`.
    #[must_use]
    pub fn artifact_path(&self, suffix: &str) -> PathBuf {
        self.workspace_path.join(format!("{}{suffix}", self.id))
    }

    pub fn start(&mut self) {
        self.status = JobStatus::Processing;
    }

    /// Moves the job to a terminal status and stamps `completed_at`.
    ///
    /// A job that is already terminal is left untouched.
    pub fn finish(&mut self, status: JobStatus) {
        if self.status.is_terminal() {
            return;
        }
        self.status = status;
        self.completed_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_hex_and_time_ordered() {
        let a = JobId::generate();
        let b = JobId::generate();
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert!(a < b, "expected {a} < {b}");
    }

    #[test]
    fn parse_rejects_path_components() {
        assert!("../etc".parse::<JobId>().is_err());
        assert!("".parse::<JobId>().is_err());
        assert!("abc def".parse::<JobId>().is_err());
        assert_eq!("17351234561234".parse::<JobId>().unwrap().as_str(), "17351234561234");
    }

    #[test]
    fn artifact_path_uses_id_and_suffix() {
        let job = Job::new("abc123".parse().unwrap(), PathBuf::from("/tmp/ws/abc123"));
        assert_eq!(job.artifact_path(".mp4"), PathBuf::from("/tmp/ws/abc123/abc123.mp4"));
        assert_eq!(
            job.artifact_path("_summary.txt"),
            PathBuf::from("/tmp/ws/abc123/abc123_summary.txt")
        );
    }

    #[test]
    fn finish_is_applied_once() {
        let mut job = Job::new(JobId::generate(), PathBuf::from("/tmp/x"));
        job.start();
        assert_eq!(job.status, JobStatus::Processing);
        job.finish(JobStatus::Completed);
        let stamped = job.completed_at;
        job.finish(JobStatus::Failed);
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.completed_at, stamped);
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&JobStatus::Completed).unwrap();
        assert_eq!(json, "\"completed\"");
    }
}
