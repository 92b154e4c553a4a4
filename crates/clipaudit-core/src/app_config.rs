use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Which capability backs sentiment classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentimentProvider {
    Lexicon,
    HuggingFace,
}

/// Which capability backs harmful-content classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarmfulProvider {
    Lexicon,
    HuggingFace,
    Perspective,
}

/// What happens to the caller's original upload once a job has run.
///
/// Failed jobs always keep the upload for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadCleanup {
    #[default]
    Retain,
    DeleteOnSuccess,
}

#[derive(Clone)]
pub struct ObjectStoreConfig {
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub prefix: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl std::fmt::Debug for ObjectStoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectStoreConfig")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("prefix", &self.prefix)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"[redacted]")
            .finish()
    }
}

#[derive(Clone)]
pub struct AppConfig {
    /// Only commands that open the document store need it.
    pub database_url: Option<String>,
    pub env: Environment,
    pub log_level: String,
    pub workspace_root: PathBuf,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub transcription_url: String,
    pub transcription_model: String,
    pub transcription_api_key: Option<String>,
    pub sentiment_provider: SentimentProvider,
    pub harmful_provider: HarmfulProvider,
    pub hf_url: String,
    pub hf_api_key: Option<String>,
    pub hf_sentiment_model: String,
    pub hf_toxicity_model: String,
    pub perspective_url: String,
    pub perspective_api_key: Option<String>,
    pub http_timeout_secs: u64,
    pub classify_concurrency: usize,
    pub job_timeout_secs: Option<u64>,
    pub upload_cleanup: UploadCleanup,
    pub object_store: Option<ObjectStoreConfig>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "[redacted]");
        f.debug_struct("AppConfig")
            .field("database_url", &redact(&self.database_url))
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("workspace_root", &self.workspace_root)
            .field("ffmpeg_path", &self.ffmpeg_path)
            .field("ffprobe_path", &self.ffprobe_path)
            .field("transcription_url", &self.transcription_url)
            .field("transcription_model", &self.transcription_model)
            .field(
                "transcription_api_key",
                &redact(&self.transcription_api_key),
            )
            .field("sentiment_provider", &self.sentiment_provider)
            .field("harmful_provider", &self.harmful_provider)
            .field("hf_url", &self.hf_url)
            .field("hf_api_key", &redact(&self.hf_api_key))
            .field("hf_sentiment_model", &self.hf_sentiment_model)
            .field("hf_toxicity_model", &self.hf_toxicity_model)
            .field("perspective_url", &self.perspective_url)
            .field("perspective_api_key", &redact(&self.perspective_api_key))
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("classify_concurrency", &self.classify_concurrency)
            .field("job_timeout_secs", &self.job_timeout_secs)
            .field("upload_cleanup", &self.upload_cleanup)
            .field("object_store", &self.object_store)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}

impl AppConfig {
    /// The document-store URL, for commands that connect to it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] if `DATABASE_URL` is not set.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
    }
}
