use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::job::{Job, JobStatus};
use crate::media::VideoInfo;

/// The persisted analysis document.
///
/// Field names are part of the stored document format and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub job_id: String,
    pub source_video_path: String,
    pub audio_artifact_path: Option<String>,
    /// Public object-storage URL of the audio artifact, when uploaded.
    #[serde(default)]
    pub audio_url: Option<String>,
    pub video_info: Option<VideoInfo>,
    pub status: JobStatus,
    pub upload_timestamp: String,
    /// Empty until the job reaches a terminal status.
    #[serde(default)]
    pub processed_timestamp: String,
}

impl AnalysisRecord {
    /// Initial record written when the job starts processing.
    #[must_use]
    pub fn processing(job: &Job, source_video_path: &str) -> Self {
        Self {
            job_id: job.id.to_string(),
            source_video_path: source_video_path.to_string(),
            audio_artifact_path: None,
            audio_url: None,
            video_info: None,
            status: JobStatus::Processing,
            upload_timestamp: iso_timestamp(job.created_at),
            processed_timestamp: String::new(),
        }
    }
}

#[must_use]
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::job::JobId;

    #[test]
    fn processing_record_has_empty_processed_timestamp() {
        let job = Job::new(JobId::generate(), PathBuf::from("/tmp/ws"));
        let record = AnalysisRecord::processing(&job, "/tmp/ws/x.mp4");
        assert_eq!(record.status, JobStatus::Processing);
        assert!(record.processed_timestamp.is_empty());
        assert!(record.upload_timestamp.ends_with('Z'));
    }

    #[test]
    fn serializes_camel_case_document() {
        let job = Job::new("abc".parse().unwrap(), PathBuf::from("/tmp/ws"));
        let mut record = AnalysisRecord::processing(&job, "/tmp/ws/abc.mp4");
        record.video_info = Some(VideoInfo::from_stream(320, 240, 300, 30.0));
        let json = serde_json::to_value(&record).unwrap();
        for key in [
            "jobId",
            "sourceVideoPath",
            "audioArtifactPath",
            "videoInfo",
            "status",
            "uploadTimestamp",
            "processedTimestamp",
        ] {
            assert!(json.get(key).is_some(), "missing {key} in {json}");
        }
        assert_eq!(json["status"], "processing");
        assert_eq!(json["videoInfo"]["width"], 320);
    }
}
