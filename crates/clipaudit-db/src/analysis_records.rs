//! Document-store operations for the `analysis_records` table.
//!
//! Each row holds one [`AnalysisRecord`] serialized as JSONB, keyed by
//! `(collection, job_id)`. A record is inserted once while the job is
//! `processing` and finalized at most once.

use chrono::{DateTime, Utc};
use clipaudit_core::AnalysisRecord;
use serde_json::Value;
use sqlx::PgPool;

use crate::DbError;

/// Collection name used for video analysis records.
pub const DEFAULT_COLLECTION: &str = "videoMetadata";

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `analysis_records` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalysisRecordRow {
    pub id: i64,
    pub collection: String,
    pub job_id: String,
    pub status: String,
    pub document: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AnalysisRecordRow {
    /// Decode the stored JSONB document.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if the document no longer matches the
    /// [`AnalysisRecord`] shape.
    pub fn record(&self) -> Result<AnalysisRecord, serde_json::Error> {
        serde_json::from_value(self.document.clone())
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Insert a new record and return its generated id.
///
/// # Errors
///
/// Returns [`DbError::DuplicateJob`] if a record for the same job already
/// exists in `collection`, or [`DbError::Sqlx`] if the insert fails.
pub async fn insert_document(
    pool: &PgPool,
    collection: &str,
    record: &AnalysisRecord,
) -> Result<i64, DbError> {
    let document = serde_json::to_value(record)?;

    let id: Option<i64> = sqlx::query_scalar(
        "INSERT INTO analysis_records (collection, job_id, status, document) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (collection, job_id) DO NOTHING \
         RETURNING id",
    )
    .bind(collection)
    .bind(&record.job_id)
    .bind(record.status.as_str())
    .bind(document)
    .fetch_optional(pool)
    .await?;

    id.ok_or_else(|| DbError::DuplicateJob {
        collection: collection.to_string(),
        job_id: record.job_id.clone(),
    })
}

/// Replace the stored document with its final state.
///
/// Only a record still in `processing` status can be finalized, so each
/// record is updated at most once.
///
/// # Errors
///
/// Returns [`DbError::InvalidRecordTransition`] if no `processing` record
/// exists for the job, or [`DbError::Sqlx`] if the update fails.
pub async fn finalize_document(
    pool: &PgPool,
    collection: &str,
    record: &AnalysisRecord,
) -> Result<(), DbError> {
    let document = serde_json::to_value(record)?;

    let result = sqlx::query(
        "UPDATE analysis_records \
         SET status = $1, document = $2, updated_at = NOW() \
         WHERE collection = $3 AND job_id = $4 AND status = 'processing'",
    )
    .bind(record.status.as_str())
    .bind(document)
    .bind(collection)
    .bind(&record.job_id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRecordTransition {
            job_id: record.job_id.clone(),
            expected_status: "processing",
        });
    }

    Ok(())
}

/// Fetch the record for one job.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no record exists, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_document(
    pool: &PgPool,
    collection: &str,
    job_id: &str,
) -> Result<AnalysisRecordRow, DbError> {
    sqlx::query_as::<_, AnalysisRecordRow>(
        "SELECT id, collection, job_id, status, document, created_at, updated_at \
         FROM analysis_records \
         WHERE collection = $1 AND job_id = $2",
    )
    .bind(collection)
    .bind(job_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// Returns the most recent `limit` records, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_documents(
    pool: &PgPool,
    collection: &str,
    limit: i64,
) -> Result<Vec<AnalysisRecordRow>, DbError> {
    let rows = sqlx::query_as::<_, AnalysisRecordRow>(
        "SELECT id, collection, job_id, status, document, created_at, updated_at \
         FROM analysis_records \
         WHERE collection = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(collection)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
