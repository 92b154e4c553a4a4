//! Upload validation and placement into the job workspace.

use std::path::{Path, PathBuf};

use clipaudit_core::Job;

use crate::error::MediaError;

/// Accepted video extensions, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: &[&str] = &["mp4", "avi", "mov"];

/// Validate a declared upload filename and return its lowercase extension.
///
/// Rejects names containing whitespace, names without an extension, and
/// extensions outside [`ALLOWED_EXTENSIONS`]. Pure: touches no files.
///
/// # Errors
///
/// Returns [`MediaError::Validation`] describing the first rule violated.
pub fn validate_filename(filename: &str) -> Result<String, MediaError> {
    let reject = |reason: &str| MediaError::Validation {
        filename: filename.to_string(),
        reason: reason.to_string(),
    };

    if filename.trim().is_empty() {
        return Err(reject("file name is empty"));
    }
    if filename.chars().any(char::is_whitespace) {
        return Err(reject("file name contains whitespace"));
    }

    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| reject("file name has no extension"))?;

    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(reject(&format!(
            "unsupported video format .{extension} (supported: .mp4, .avi, .mov)"
        )));
    }

    Ok(extension)
}

/// Write uploaded bytes into the job workspace as `<id>.<ext>`.
///
/// Validation happens before anything is written.
///
/// # Errors
///
/// Returns [`MediaError::Validation`] for a rejected filename or
/// [`MediaError::Io`] if the write fails.
pub async fn ingest(bytes: &[u8], declared_filename: &str, job: &Job) -> Result<PathBuf, MediaError> {
    let extension = validate_filename(declared_filename)?;
    let target = job.artifact_path(&format!(".{extension}"));

    tokio::fs::write(&target, bytes)
        .await
        .map_err(|e| MediaError::io(&target, e))?;

    tracing::info!(
        job_id = %job.id,
        filename = declared_filename,
        bytes = bytes.len(),
        path = %target.display(),
        "video ingested"
    );
    Ok(target)
}

/// Copy an upload that already exists on disk into the job workspace.
///
/// The source file is left in place; whether to delete it afterwards is the
/// caller's cleanup policy.
///
/// # Errors
///
/// Returns [`MediaError::Validation`] if the source file name is rejected or
/// [`MediaError::Io`] if the copy fails.
pub async fn ingest_file(source: &Path, job: &Job) -> Result<PathBuf, MediaError> {
    let declared = source
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let extension = validate_filename(declared)?;
    let target = job.artifact_path(&format!(".{extension}"));

    let copied = tokio::fs::copy(source, &target)
        .await
        .map_err(|e| MediaError::io(source, e))?;

    tracing::info!(
        job_id = %job.id,
        source = %source.display(),
        bytes = copied,
        path = %target.display(),
        "video ingested"
    );
    Ok(target)
}
