//! Persistence gateway: the document store and optional object storage.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use clipaudit_core::{AnalysisRecord, ObjectStoreConfig};
use clipaudit_db::DbError;
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("document store: {0}")]
    Store(#[from] DbError),

    #[error("record for job {0} already exists")]
    Duplicate(String),

    #[error("record for job {0} is not awaiting finalization")]
    NotProcessing(String),

    #[error("cannot read artifact {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("object storage: {0}")]
    Upload(String),
}

/// Document-store write capability for [`AnalysisRecord`]s.
///
/// A record is inserted once and finalized at most once.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a new record and return its generated id.
    async fn insert(&self, record: &AnalysisRecord) -> Result<i64, PersistenceError>;

    /// Replace a `processing` record with its terminal state.
    async fn finalize(&self, record: &AnalysisRecord) -> Result<(), PersistenceError>;
}

/// [`RecordStore`] over the Postgres `analysis_records` table.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
    collection: String,
}

impl PgRecordStore {
    #[must_use]
    pub fn new(pool: PgPool, collection: impl Into<String>) -> Self {
        Self {
            pool,
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert(&self, record: &AnalysisRecord) -> Result<i64, PersistenceError> {
        Ok(clipaudit_db::insert_document(&self.pool, &self.collection, record).await?)
    }

    async fn finalize(&self, record: &AnalysisRecord) -> Result<(), PersistenceError> {
        Ok(clipaudit_db::finalize_document(&self.pool, &self.collection, record).await?)
    }
}

/// In-process [`RecordStore`] with the same insert-once and finalize-once
/// rules as the database. Used for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    records: Mutex<HashMap<String, (i64, AnalysisRecord)>>,
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, job_id: &str) -> Option<AnalysisRecord> {
        self.lock().get(job_id).map(|(_, r)| r.clone())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, (i64, AnalysisRecord)>> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn insert(&self, record: &AnalysisRecord) -> Result<i64, PersistenceError> {
        let mut records = self.lock();
        if records.contains_key(&record.job_id) {
            return Err(PersistenceError::Duplicate(record.job_id.clone()));
        }
        let id = i64::try_from(records.len()).unwrap_or(i64::MAX) + 1;
        records.insert(record.job_id.clone(), (id, record.clone()));
        Ok(id)
    }

    async fn finalize(&self, record: &AnalysisRecord) -> Result<(), PersistenceError> {
        let mut records = self.lock();
        match records.get_mut(&record.job_id) {
            Some((_, stored)) if !stored.status.is_terminal() => {
                *stored = record.clone();
                Ok(())
            }
            _ => Err(PersistenceError::NotProcessing(record.job_id.clone())),
        }
    }
}

/// Object-storage upload capability returning a public URL.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<String, PersistenceError>;
}

/// [`ObjectStore`] backed by S3 or an S3-compatible endpoint such as `MinIO`.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    endpoint: Option<String>,
    prefix: String,
}

impl S3ObjectStore {
    #[must_use]
    pub fn new(config: &ObjectStoreConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "clipaudit",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .behavior_version_latest();

        // Custom endpoints (MinIO) need path-style addressing.
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self {
            client: aws_sdk_s3::Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            endpoint: config.endpoint.clone(),
            prefix: config.prefix.clone(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(&self, path: &Path) -> Result<String, PersistenceError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| PersistenceError::Upload(format!("no file name in {}", path.display())))?;
        let key = format!("{}{name}", self.prefix);

        let data = tokio::fs::read(path)
            .await
            .map_err(|source| PersistenceError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type("audio/mpeg")
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| PersistenceError::Upload(e.to_string()))?;

        tracing::info!(bucket = %self.bucket, key = %key, "artifact uploaded");
        Ok(public_url(&self.bucket, self.endpoint.as_deref(), &key))
    }
}

/// Public URL of an uploaded object.
///
/// Virtual-hosted AWS form by default, `<endpoint>/<bucket>/<key>` for
/// custom endpoints.
#[must_use]
pub fn public_url(bucket: &str, endpoint: Option<&str>, key: &str) -> String {
    match endpoint {
        Some(endpoint) => format!("{}/{bucket}/{key}", endpoint.trim_end_matches('/')),
        None => format!("https://{bucket}.s3.amazonaws.com/{key}"),
    }
}
