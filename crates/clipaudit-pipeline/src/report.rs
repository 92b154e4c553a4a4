//! Summary artifact, tabular metadata export and record assembly.

use std::path::{Path, PathBuf};

use clipaudit_core::{iso_timestamp, AnalysisRecord, Issue, Job, JobId, JobStatus, VideoInfo};
use serde::Serialize;
use thiserror::Error;

/// First line of every summary artifact.
pub const SUMMARY_HEADER: &str = "Video Analysis Summary:";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV encoding failed: {0}")]
    Csv(String),
}

/// Render the summary text: the header, a blank line, then one
/// `<category> at <timestamp>` line per issue in issue order.
#[must_use]
pub fn render_summary(issues: &[Issue]) -> String {
    let mut out = format!("{SUMMARY_HEADER}\n\n");
    for issue in issues {
        out.push_str(&format!("{} at {}\n", issue.category, issue.timestamp));
    }
    out
}

/// Write `<id>_summary.txt` into `workspace`.
///
/// # Errors
///
/// Returns [`ReportError::Write`] if the file cannot be written.
pub async fn build_summary(
    job_id: &JobId,
    issues: &[Issue],
    workspace: &Path,
) -> Result<PathBuf, ReportError> {
    let path = workspace.join(format!("{job_id}_summary.txt"));
    tokio::fs::write(&path, render_summary(issues))
        .await
        .map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MetadataRow<'a> {
    job_id: &'a str,
    width: u32,
    height: u32,
    frame_count: u64,
    fps: f64,
    duration_minutes: f64,
}

/// Write `<id>.csv` with a header row and one row of video metadata.
///
/// # Errors
///
/// Returns [`ReportError::Csv`] if encoding fails or [`ReportError::Write`]
/// if the file cannot be written.
pub async fn export_metadata_csv(
    job_id: &JobId,
    info: &VideoInfo,
    workspace: &Path,
) -> Result<PathBuf, ReportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .serialize(MetadataRow {
            job_id: job_id.as_str(),
            width: info.width,
            height: info.height,
            frame_count: info.frame_count,
            fps: info.fps,
            duration_minutes: info.duration_minutes,
        })
        .map_err(|e| ReportError::Csv(e.to_string()))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| ReportError::Csv(e.to_string()))?;

    let path = workspace.join(format!("{job_id}.csv"));
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}

/// Assemble the persisted document for `job` in the given status.
///
/// `processedTimestamp` is set only for terminal statuses.
#[must_use]
pub fn build_record(
    job: &Job,
    source_video: &Path,
    video_info: Option<VideoInfo>,
    audio_path: Option<&Path>,
    status: JobStatus,
) -> AnalysisRecord {
    let mut record = AnalysisRecord::processing(job, &source_video.to_string_lossy());
    record.video_info = video_info;
    record.audio_artifact_path = audio_path.map(|p| p.to_string_lossy().into_owned());
    record.status = status;
    if status.is_terminal() {
        let processed_at = job.completed_at.unwrap_or_else(chrono::Utc::now);
        record.processed_timestamp = iso_timestamp(processed_at);
    }
    record
}

#[cfg(test)]
mod tests {
    use clipaudit_core::{IssueCategory, TranscriptSegment};

    use super::*;

    fn issue(start: f64, category: IssueCategory) -> Issue {
        Issue::at(
            &TranscriptSegment::new(start, start + 1.0, "x").unwrap(),
            category,
            None,
        )
    }

    #[test]
    fn summary_lists_issues_in_order_after_header() {
        let text = render_summary(&[
            issue(2.0, IssueCategory::NegativeSentiment),
            issue(3725.9, IssueCategory::ToxicContent),
        ]);
        assert_eq!(
            text,
            "Video Analysis Summary:\n\nnegative sentiment at 00:00:02\ntoxic content at 01:02:05\n"
        );
    }

    #[test]
    fn empty_summary_is_header_only() {
        assert_eq!(render_summary(&[]), "Video Analysis Summary:\n\n");
    }

    #[tokio::test]
    async fn summary_and_csv_are_named_by_job_id() {
        let tmp = tempfile::tempdir().unwrap();
        let id: JobId = "abc123".parse().unwrap();

        let summary = build_summary(&id, &[], tmp.path()).await.unwrap();
        assert_eq!(summary, tmp.path().join("abc123_summary.txt"));

        let info = VideoInfo::from_stream(320, 240, 300, 30.0);
        let csv_path = export_metadata_csv(&id, &info, tmp.path()).await.unwrap();
        assert_eq!(csv_path, tmp.path().join("abc123.csv"));
        let contents = std::fs::read_to_string(csv_path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next(),
            Some("jobId,width,height,frameCount,fps,durationMinutes")
        );
        assert_eq!(lines.next(), Some("abc123,320,240,300,30.0,0.17"));
    }

    #[tokio::test]
    async fn summary_write_failure_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("gone");
        let id: JobId = "abc".parse().unwrap();
        let err = build_summary(&id, &[], &missing).await.unwrap_err();
        assert!(matches!(err, ReportError::Write { .. }));
    }

    #[test]
    fn terminal_record_is_stamped() {
        let mut job = Job::new("abc".parse().unwrap(), PathBuf::from("/w/abc"));
        job.start();
        let pending = build_record(
            &job,
            Path::new("/w/abc/abc.mp4"),
            None,
            None,
            JobStatus::Processing,
        );
        assert!(pending.processed_timestamp.is_empty());

        job.finish(JobStatus::Completed);
        let done = build_record(
            &job,
            Path::new("/w/abc/abc.mp4"),
            None,
            Some(Path::new("/w/abc/abc.mp3")),
            JobStatus::Completed,
        );
        assert_eq!(done.status, JobStatus::Completed);
        assert!(done.processed_timestamp.ends_with('Z'));
        assert_eq!(done.audio_artifact_path.as_deref(), Some("/w/abc/abc.mp3"));
    }
}
