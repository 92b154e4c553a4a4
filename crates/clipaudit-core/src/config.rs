use std::path::PathBuf;

use crate::app_config::{
    AppConfig, Environment, HarmfulProvider, ObjectStoreConfig, SentimentProvider, UploadCleanup,
};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it from a `HashMap`.
#[allow(clippy::too_many_lines)]
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = optional("DATABASE_URL");
    let env = parse_environment(&or_default("CLIPAUDIT_ENV", "development"))?;
    let log_level = or_default("CLIPAUDIT_LOG_LEVEL", "info");
    let workspace_root = PathBuf::from(or_default("CLIPAUDIT_WORKSPACE_ROOT", "./static/uploads"));

    let ffmpeg_path = or_default("CLIPAUDIT_FFMPEG_PATH", "ffmpeg");
    let ffprobe_path = or_default("CLIPAUDIT_FFPROBE_PATH", "ffprobe");

    let transcription_url = or_default("CLIPAUDIT_TRANSCRIPTION_URL", "http://localhost:9000");
    let transcription_model = or_default("CLIPAUDIT_TRANSCRIPTION_MODEL", "whisper-1");
    let transcription_api_key = optional("CLIPAUDIT_TRANSCRIPTION_API_KEY");

    let sentiment_provider =
        parse_sentiment_provider(&or_default("CLIPAUDIT_SENTIMENT_PROVIDER", "lexicon"))?;
    let harmful_provider =
        parse_harmful_provider(&or_default("CLIPAUDIT_HARMFUL_PROVIDER", "lexicon"))?;

    let hf_url = or_default("CLIPAUDIT_HF_URL", "https://api-inference.huggingface.co");
    let hf_api_key = optional("CLIPAUDIT_HF_API_KEY");
    let hf_sentiment_model = or_default(
        "CLIPAUDIT_HF_SENTIMENT_MODEL",
        "distilbert-base-uncased-finetuned-sst-2-english",
    );
    let hf_toxicity_model = or_default("CLIPAUDIT_HF_TOXICITY_MODEL", "unitary/toxic-bert");

    let perspective_url = or_default(
        "CLIPAUDIT_PERSPECTIVE_URL",
        "https://commentanalyzer.googleapis.com",
    );
    let perspective_api_key = optional("CLIPAUDIT_PERSPECTIVE_API_KEY");
    if harmful_provider == HarmfulProvider::Perspective && perspective_api_key.is_none() {
        return Err(ConfigError::MissingEnvVar(
            "CLIPAUDIT_PERSPECTIVE_API_KEY".to_string(),
        ));
    }

    let http_timeout_secs = parse_u64("CLIPAUDIT_HTTP_TIMEOUT_SECS", "60")?;
    let classify_concurrency = parse_usize("CLIPAUDIT_CLASSIFY_CONCURRENCY", "4")?.max(1);
    let job_timeout_secs = match parse_u64("CLIPAUDIT_JOB_TIMEOUT_SECS", "0")? {
        0 => None,
        secs => Some(secs),
    };
    let upload_cleanup = parse_upload_cleanup(&or_default("CLIPAUDIT_UPLOAD_CLEANUP", "retain"))?;

    let object_store = match optional("CLIPAUDIT_S3_BUCKET") {
        Some(bucket) => Some(ObjectStoreConfig {
            bucket,
            region: or_default("CLIPAUDIT_S3_REGION", "us-east-1"),
            endpoint: optional("CLIPAUDIT_S3_ENDPOINT"),
            prefix: or_default("CLIPAUDIT_S3_PREFIX", "audio/"),
            access_key_id: require("AWS_ACCESS_KEY_ID")?,
            secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
        }),
        None => None,
    };

    let db_max_connections = parse_u32("CLIPAUDIT_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("CLIPAUDIT_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("CLIPAUDIT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        workspace_root,
        ffmpeg_path,
        ffprobe_path,
        transcription_url,
        transcription_model,
        transcription_api_key,
        sentiment_provider,
        harmful_provider,
        hf_url,
        hf_api_key,
        hf_sentiment_model,
        hf_toxicity_model,
        perspective_url,
        perspective_api_key,
        http_timeout_secs,
        classify_concurrency,
        job_timeout_secs,
        upload_cleanup,
        object_store,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CLIPAUDIT_ENV".to_string(),
            reason: format!("unknown environment {other:?}"),
        }),
    }
}

fn parse_sentiment_provider(s: &str) -> Result<SentimentProvider, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "lexicon" => Ok(SentimentProvider::Lexicon),
        "huggingface" | "hf" => Ok(SentimentProvider::HuggingFace),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CLIPAUDIT_SENTIMENT_PROVIDER".to_string(),
            reason: format!("unknown provider {other:?}"),
        }),
    }
}

fn parse_harmful_provider(s: &str) -> Result<HarmfulProvider, ConfigError> {
    match s.to_ascii_lowercase().as_str() {
        "lexicon" => Ok(HarmfulProvider::Lexicon),
        "huggingface" | "hf" => Ok(HarmfulProvider::HuggingFace),
        "perspective" => Ok(HarmfulProvider::Perspective),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CLIPAUDIT_HARMFUL_PROVIDER".to_string(),
            reason: format!("unknown provider {other:?}"),
        }),
    }
}

fn parse_upload_cleanup(s: &str) -> Result<UploadCleanup, ConfigError> {
    match s {
        "retain" => Ok(UploadCleanup::Retain),
        "delete-on-success" => Ok(UploadCleanup::DeleteOnSuccess),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CLIPAUDIT_UPLOAD_CLEANUP".to_string(),
            reason: format!("expected retain or delete-on-success, got {other:?}"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
