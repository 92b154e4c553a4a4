//! Per-job identity and workspace allocation.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use clipaudit_core::{Job, JobId};

use crate::error::MediaError;

/// Attempts before giving up when a freshly generated id already has a directory.
const MAX_ALLOCATION_ATTEMPTS: usize = 8;

/// Allocates one directory per job under a shared root.
///
/// Each job directory is created with `create_dir`, never `create_dir_all`, so
/// a directory that already exists is never handed to a second job.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a new job with a unique id and an empty workspace directory.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Workspace`] if the root or the job directory
    /// cannot be created.
    pub async fn new_job(&self) -> Result<Job, MediaError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| MediaError::Workspace {
                path: self.root.clone(),
                source,
            })?;

        let mut last_collision = None;
        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let id = JobId::generate();
            let path = self.root.join(id.as_str());
            match tokio::fs::create_dir(&path).await {
                Ok(()) => {
                    tracing::debug!(job_id = %id, path = %path.display(), "workspace allocated");
                    return Ok(Job::new(id, path));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::warn!(job_id = %id, "workspace already exists, regenerating id");
                    last_collision = Some((path, e));
                }
                Err(source) => return Err(MediaError::Workspace { path, source }),
            }
        }

        let (path, source) = last_collision.unwrap_or_else(|| {
            (
                self.root.clone(),
                std::io::Error::new(ErrorKind::AlreadyExists, "no attempts made"),
            )
        });
        Err(MediaError::Workspace { path, source })
    }

    /// Resolve the workspace of an existing job without creating anything.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::Workspace`] if the directory does not exist.
    pub async fn open_job(&self, id: JobId) -> Result<Job, MediaError> {
        let path = self.root.join(id.as_str());
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => Ok(Job::new(id, path)),
            Ok(_) => Err(MediaError::Workspace {
                path,
                source: std::io::Error::new(ErrorKind::Other, "not a directory"),
            }),
            Err(source) => Err(MediaError::Workspace { path, source }),
        }
    }
}
