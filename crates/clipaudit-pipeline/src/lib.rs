//! Pipeline orchestration for clipaudit.
//!
//! [`Pipeline`] sequences ingestion, extraction, transcription,
//! classification, aggregation, reporting and persistence for one job,
//! deciding which failures abort the job and which only degrade its result.
//! All collaborators are injected once at construction.

pub mod error;
pub mod orchestrator;
pub mod persistence;
pub mod report;

pub use error::{CancelReason, Degradation, PipelineError, Stage};
pub use orchestrator::{
    Collaborators, JobOutcome, Pipeline, PipelineSettings, SummaryOutcome, Upload,
};
pub use persistence::{
    public_url, MemoryRecordStore, ObjectStore, PersistenceError, PgRecordStore, RecordStore,
    S3ObjectStore,
};
pub use report::{
    build_record, build_summary, export_metadata_csv, render_summary, ReportError, SUMMARY_HEADER,
};
