//! The job state machine.
//!
//! `Created -> Ingested -> Extracted -> Transcribed -> Classified ->
//! Aggregated -> Persisted`, with `Failed` reachable from every non-terminal
//! state. The analysis record is inserted as `processing` once the upload is
//! in the workspace and finalized exactly once, as `completed` or `failed`.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use clipaudit_analysis::{
    aggregate, join_segments, Aggregation, Classifiers, DocumentAssessment, Transcriber,
};
use clipaudit_core::{
    AnalysisRecord, Issue, Job, JobId, JobStatus, TranscriptSegment, UploadCleanup, VideoInfo,
};
use clipaudit_media::{
    extract_audio, extract_video_info, ingest, ingest_file, validate_filename, AudioExtractor,
    MediaError, VideoProbe, WorkspaceManager,
};
use tokio_util::sync::CancellationToken;

use crate::error::{CancelReason, Degradation, PipelineError, Stage};
use crate::persistence::{ObjectStore, RecordStore};
use crate::report::{build_record, build_summary, export_metadata_csv};

/// Tunables that do not change between jobs.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Segments classified at once; each makes two provider calls.
    pub classify_concurrency: usize,
    /// Deadline for everything after ingestion; `None` waits indefinitely.
    pub job_timeout: Option<Duration>,
    pub upload_cleanup: UploadCleanup,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            classify_concurrency: 4,
            job_timeout: None,
            upload_cleanup: UploadCleanup::Retain,
        }
    }
}

/// Everything the pipeline talks to, constructed once at process start.
pub struct Collaborators {
    pub workspaces: WorkspaceManager,
    pub extractor: Arc<dyn AudioExtractor>,
    pub probe: Arc<dyn VideoProbe>,
    pub transcriber: Transcriber,
    pub classifiers: Classifiers,
    pub records: Arc<dyn RecordStore>,
    pub objects: Option<Arc<dyn ObjectStore>>,
}

/// The video to analyze.
#[derive(Debug, Clone, Copy)]
pub enum Upload<'a> {
    /// Raw bytes with the filename the uploader declared.
    Bytes { bytes: &'a [u8], filename: &'a str },
    /// A file already on disk; subject to the cleanup policy.
    File(&'a Path),
}

impl Upload<'_> {
    fn declared_name(&self) -> String {
        match self {
            Self::Bytes { filename, .. } => (*filename).to_string(),
            Self::File(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

/// Result of a completed job.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    pub job: Job,
    pub record: AnalysisRecord,
    pub issues: Vec<Issue>,
    pub video_info: Option<VideoInfo>,
    pub summary_path: Option<PathBuf>,
    pub metadata_path: Option<PathBuf>,
    pub segments: Vec<TranscriptSegment>,
    pub transcript: String,
    pub assessment: DocumentAssessment,
    pub classification_failures: usize,
    pub degradations: Vec<Degradation>,
}

impl JobOutcome {
    #[must_use]
    pub fn status(&self) -> JobStatus {
        self.job.status
    }
}

/// Result of re-summarizing an existing job workspace.
#[derive(Debug, Clone)]
pub struct SummaryOutcome {
    pub job_id: JobId,
    pub summary_path: PathBuf,
    pub issues: Vec<Issue>,
    pub classification_failures: usize,
}

/// What the stages have produced so far; read back when a job fails or
/// times out so the failed record carries whatever was computed.
#[derive(Debug)]
struct Progress {
    stage: Stage,
    audio_path: Option<PathBuf>,
    video_info: Option<VideoInfo>,
}

struct StageOutput {
    audio_path: PathBuf,
    video_info: Option<VideoInfo>,
    segments: Vec<TranscriptSegment>,
    transcript: String,
    aggregation: Aggregation,
    assessment: DocumentAssessment,
    summary_path: Option<PathBuf>,
    metadata_path: Option<PathBuf>,
    audio_url: Option<String>,
    degradations: Vec<Degradation>,
}

pub struct Pipeline {
    collaborators: Collaborators,
    settings: PipelineSettings,
}

impl Pipeline {
    #[must_use]
    pub fn new(collaborators: Collaborators, settings: PipelineSettings) -> Self {
        Self {
            collaborators,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run one job end to end.
    ///
    /// # Errors
    ///
    /// Returns the fatal [`PipelineError`] that stopped the job. When a
    /// record had already been inserted it is finalized as `failed`, and
    /// workspace artifacts are always left in place.
    pub async fn analyze(
        &self,
        upload: Upload<'_>,
        cancel: CancellationToken,
    ) -> Result<JobOutcome, PipelineError> {
        let declared = upload.declared_name();
        if let Err(e) = validate_filename(&declared) {
            tracing::warn!(filename = %declared, error = %e, "upload rejected");
            return Err(match e {
                MediaError::Validation { filename, reason } => {
                    PipelineError::Validation { filename, reason }
                }
                other => PipelineError::Validation {
                    filename: declared,
                    reason: other.to_string(),
                },
            });
        }

        let mut job = self
            .collaborators
            .workspaces
            .new_job()
            .await
            .map_err(PipelineError::Workspace)?;
        tracing::info!(job_id = %job.id, filename = %declared, "job created");

        let video_path = match upload {
            Upload::Bytes { bytes, filename } => ingest(bytes, filename, &job).await,
            Upload::File(path) => ingest_file(path, &job).await,
        }
        .map_err(|e| PipelineError::from_ingest(&job.id, e))?;

        job.start();
        let initial = AnalysisRecord::processing(&job, &video_path.to_string_lossy());
        self.collaborators
            .records
            .insert(&initial)
            .await
            .map_err(|source| PipelineError::Persistence {
                job_id: job.id.clone(),
                source,
            })?;
        tracing::info!(job_id = %job.id, stage = "ingestion", "job ingested");

        let progress = Mutex::new(Progress {
            stage: Stage::Extraction,
            audio_path: None,
            video_info: None,
        });

        let result = self
            .run_guarded(&job, &video_path, &progress, &cancel)
            .await;

        match result {
            Ok(output) => self.complete(job, &video_path, upload, output).await,
            Err(err) => {
                let progress = progress.into_inner().unwrap_or_else(PoisonError::into_inner);
                self.fail(job, &video_path, &progress, &err).await;
                Err(err)
            }
        }
    }

    /// Transcribe an existing job's audio and rewrite its summary.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Workspace`] if the job has no workspace,
    /// [`PipelineError::Transcription`] if transcription fails, or
    /// [`PipelineError::Pipeline`] if the summary cannot be written.
    pub async fn summarize_existing(
        &self,
        job_id: JobId,
        audio: &Path,
    ) -> Result<SummaryOutcome, PipelineError> {
        let job = self
            .collaborators
            .workspaces
            .open_job(job_id)
            .await
            .map_err(PipelineError::Workspace)?;

        let segments = self
            .collaborators
            .transcriber
            .transcribe_with_timestamps(audio)
            .await
            .map_err(|source| PipelineError::Transcription {
                job_id: job.id.clone(),
                source,
            })?;

        let aggregation = aggregate(
            &segments,
            &self.collaborators.classifiers,
            self.settings.classify_concurrency,
        )
        .await;

        let summary_path = build_summary(&job.id, &aggregation.issues, &job.workspace_path)
            .await
            .map_err(|e| PipelineError::Pipeline {
                job_id: job.id.clone(),
                stage: Stage::Report,
                message: e.to_string(),
            })?;
        tracing::info!(
            job_id = %job.id,
            issues = aggregation.issues.len(),
            path = %summary_path.display(),
            "summary generated"
        );

        Ok(SummaryOutcome {
            classification_failures: aggregation.classification_failures(),
            job_id: job.id,
            summary_path,
            issues: aggregation.issues,
        })
    }

    /// Run the stages under the caller's cancellation token and the job deadline.
    async fn run_guarded(
        &self,
        job: &Job,
        video_path: &Path,
        progress: &Mutex<Progress>,
        cancel: &CancellationToken,
    ) -> Result<StageOutput, PipelineError> {
        let current_stage = || progress.lock().unwrap_or_else(PoisonError::into_inner).stage;
        let stages = self.run_stages(job, video_path, progress);

        let deadline = async {
            match self.settings.job_timeout {
                Some(limit) => match tokio::time::timeout(limit, stages).await {
                    Ok(result) => result,
                    Err(_) => Err(PipelineError::Cancelled {
                        job_id: job.id.clone(),
                        stage: current_stage(),
                        reason: CancelReason::Timeout(limit),
                    }),
                },
                None => stages.await,
            }
        };

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(PipelineError::Cancelled {
                job_id: job.id.clone(),
                stage: current_stage(),
                reason: CancelReason::Caller,
            }),
            result = deadline => result,
        }
    }

    async fn run_stages(
        &self,
        job: &Job,
        video_path: &Path,
        progress: &Mutex<Progress>,
    ) -> Result<StageOutput, PipelineError> {
        let c = &self.collaborators;
        let job_id = &job.id;
        let enter = |stage: Stage| {
            progress.lock().unwrap_or_else(PoisonError::into_inner).stage = stage;
            tracing::info!(job_id = %job_id, stage = %stage, "stage started");
        };
        let mut degradations = Vec::new();

        enter(Stage::Extraction);
        let metadata = async {
            let info = extract_video_info(c.probe.as_ref(), video_path).await;
            if let Ok(info) = &info {
                let mut progress = progress.lock().unwrap_or_else(PoisonError::into_inner);
                progress.video_info = Some(*info);
            }
            info
        };
        let (audio, info) = tokio::join!(
            extract_audio(c.extractor.as_ref(), video_path),
            metadata,
        );
        let video_info = match info {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!(job_id = %job_id, error = %e, "video metadata unavailable");
                degradations.push(Degradation::VideoInfoUnavailable {
                    message: e.to_string(),
                });
                None
            }
        };
        let audio_path = audio.map_err(|source| PipelineError::Extraction {
            job_id: job_id.clone(),
            source,
        })?;
        progress.lock().unwrap_or_else(PoisonError::into_inner).audio_path =
            Some(audio_path.clone());

        enter(Stage::Transcription);
        let segments = c
            .transcriber
            .transcribe_with_timestamps(&audio_path)
            .await
            .map_err(|source| PipelineError::Transcription {
                job_id: job_id.clone(),
                source,
            })?;
        let transcript = join_segments(&segments);

        enter(Stage::Classification);
        let (aggregation, assessment) = tokio::join!(
            aggregate(&segments, &c.classifiers, self.settings.classify_concurrency),
            c.classifiers.assess(&transcript),
        );
        if aggregation.classification_failures() > 0 {
            degradations.push(Degradation::ClassificationFailures {
                count: aggregation.classification_failures(),
            });
        }
        for failure in [&assessment.sentiment, &assessment.harmful_content]
            .into_iter()
            .filter_map(|r| r.as_ref().err())
        {
            tracing::warn!(job_id = %job_id, error = %failure, "transcript assessment failed");
            degradations.push(Degradation::DocumentAssessmentFailed {
                message: failure.to_string(),
            });
        }

        enter(Stage::Aggregation);
        tracing::info!(
            job_id = %job_id,
            segments = segments.len(),
            issues = aggregation.issues.len(),
            failures = aggregation.classification_failures(),
            "issues aggregated"
        );

        enter(Stage::Report);
        let summary_path =
            match build_summary(job_id, &aggregation.issues, &job.workspace_path).await {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(job_id = %job_id, error = %e, "summary not written");
                    degradations.push(Degradation::SummaryWriteFailed {
                        path: job.artifact_path("_summary.txt"),
                        message: e.to_string(),
                    });
                    None
                }
            };
        let metadata_path = match &video_info {
            Some(info) => match export_metadata_csv(job_id, info, &job.workspace_path).await {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!(job_id = %job_id, error = %e, "metadata export not written");
                    degradations.push(Degradation::MetadataExportFailed {
                        path: job.artifact_path(".csv"),
                        message: e.to_string(),
                    });
                    None
                }
            },
            None => None,
        };

        enter(Stage::Persistence);
        let audio_url = match &c.objects {
            Some(objects) => match objects.upload(&audio_path).await {
                Ok(url) => Some(url),
                Err(e) => {
                    tracing::warn!(job_id = %job_id, error = %e, "audio upload failed");
                    degradations.push(Degradation::ArtifactUploadFailed {
                        message: e.to_string(),
                    });
                    None
                }
            },
            None => None,
        };

        Ok(StageOutput {
            audio_path,
            video_info,
            segments,
            transcript,
            aggregation,
            assessment,
            summary_path,
            metadata_path,
            audio_url,
            degradations,
        })
    }

    async fn complete(
        &self,
        mut job: Job,
        video_path: &Path,
        upload: Upload<'_>,
        mut output: StageOutput,
    ) -> Result<JobOutcome, PipelineError> {
        job.finish(JobStatus::Completed);
        let mut record = build_record(
            &job,
            video_path,
            output.video_info,
            Some(&output.audio_path),
            JobStatus::Completed,
        );
        record.audio_url = output.audio_url.take();

        if let Err(source) = self.collaborators.records.finalize(&record).await {
            tracing::error!(job_id = %job.id, error = %source, "record not finalized");
            // One attempt to close the document as failed so it does not
            // stay `processing`.
            let failed = build_record(
                &job,
                video_path,
                output.video_info,
                Some(&output.audio_path),
                JobStatus::Failed,
            );
            if let Err(e) = self.collaborators.records.finalize(&failed).await {
                tracing::error!(job_id = %job.id, error = %e, "failed record not finalized");
            }
            return Err(PipelineError::Persistence {
                job_id: job.id.clone(),
                source,
            });
        }

        if let (Upload::File(source), UploadCleanup::DeleteOnSuccess) =
            (upload, self.settings.upload_cleanup)
        {
            match tokio::fs::remove_file(source).await {
                Ok(()) => {
                    tracing::info!(job_id = %job.id, path = %source.display(), "upload removed");
                }
                Err(e) => {
                    tracing::warn!(job_id = %job.id, error = %e, "upload not removed");
                    output.degradations.push(Degradation::UploadCleanupFailed {
                        path: source.to_path_buf(),
                        message: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            job_id = %job.id,
            issues = output.aggregation.issues.len(),
            degradations = output.degradations.len(),
            "job completed"
        );

        let classification_failures = output.aggregation.classification_failures();
        Ok(JobOutcome {
            job,
            record,
            issues: output.aggregation.issues,
            video_info: output.video_info,
            summary_path: output.summary_path,
            metadata_path: output.metadata_path,
            segments: output.segments,
            transcript: output.transcript,
            assessment: output.assessment,
            classification_failures,
            degradations: output.degradations,
        })
    }

    async fn fail(
        &self,
        mut job: Job,
        video_path: &Path,
        progress: &Progress,
        err: &PipelineError,
    ) {
        tracing::error!(job_id = %job.id, stage = %err.stage(), error = %err, "job failed");
        job.finish(JobStatus::Failed);
        let record = build_record(
            &job,
            video_path,
            progress.video_info,
            progress.audio_path.as_deref(),
            JobStatus::Failed,
        );
        if let Err(e) = self.collaborators.records.finalize(&record).await {
            tracing::error!(job_id = %job.id, error = %e, "failed record not finalized");
        }
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("workspace_root", &self.collaborators.workspaces.root())
            .field("transcriber", &self.collaborators.transcriber)
            .field("classifiers", &self.collaborators.classifiers)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
