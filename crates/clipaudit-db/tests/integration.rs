//! Offline unit tests for clipaudit-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::path::PathBuf;

use clipaudit_core::{
    AppConfig, Environment, HarmfulProvider, JobStatus, SentimentProvider, UploadCleanup,
};
use clipaudit_db::{AnalysisRecordRow, PoolConfig};

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: Some("postgres://example".to_string()),
        env: Environment::Test,
        log_level: "info".to_string(),
        workspace_root: PathBuf::from("./static/uploads"),
        ffmpeg_path: "ffmpeg".to_string(),
        ffprobe_path: "ffprobe".to_string(),
        transcription_url: "http://localhost:9000".to_string(),
        transcription_model: "whisper-1".to_string(),
        transcription_api_key: None,
        sentiment_provider: SentimentProvider::Lexicon,
        harmful_provider: HarmfulProvider::Lexicon,
        hf_url: "http://hf".to_string(),
        hf_api_key: None,
        hf_sentiment_model: "s".to_string(),
        hf_toxicity_model: "t".to_string(),
        perspective_url: "http://perspective".to_string(),
        perspective_api_key: None,
        http_timeout_secs: 60,
        classify_concurrency: 4,
        job_timeout_secs: None,
        upload_cleanup: UploadCleanup::Retain,
        object_store: None,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn analysis_record_row_decodes_stored_document() {
    use chrono::Utc;

    let row = AnalysisRecordRow {
        id: 1,
        collection: "videoMetadata".to_string(),
        job_id: "0190a1b2c3".to_string(),
        status: "completed".to_string(),
        document: serde_json::json!({
            "jobId": "0190a1b2c3",
            "sourceVideoPath": "/uploads/0190a1b2c3/0190a1b2c3.mp4",
            "audioArtifactPath": "/uploads/0190a1b2c3/0190a1b2c3.mp3",
            "audioUrl": null,
            "videoInfo": {
                "width": 320,
                "height": 240,
                "frameCount": 300,
                "fps": 30.0,
                "durationMinutes": 0.17
            },
            "status": "completed",
            "uploadTimestamp": "2026-01-01T00:00:00.000Z",
            "processedTimestamp": "2026-01-01T00:00:10.000Z"
        }),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let record = row.record().expect("document should decode");
    assert_eq!(record.job_id, "0190a1b2c3");
    assert_eq!(record.status, JobStatus::Completed);
    assert_eq!(record.video_info.map(|v| v.frame_count), Some(300));
}

#[test]
fn analysis_record_row_rejects_foreign_document() {
    use chrono::Utc;

    let row = AnalysisRecordRow {
        id: 2,
        collection: "videoMetadata".to_string(),
        job_id: "x".to_string(),
        status: "processing".to_string(),
        document: serde_json::json!({ "unrelated": true }),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert!(row.record().is_err());
}
