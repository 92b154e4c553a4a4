//! Analysis command handlers.

use std::path::Path;

use clipaudit_analysis::{Classification, ClassificationResult, Transcriber};
use clipaudit_core::format_timestamp;
use clipaudit_pipeline::{JobOutcome, Pipeline, Upload};
use serde_json::json;
use tokio_util::sync::CancellationToken;

/// Cancellation token that fires on Ctrl-C.
fn interrupt_token() -> (CancellationToken, tokio::task::JoinHandle<()>) {
    let token = CancellationToken::new();
    let watcher = {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, cancelling job");
                token.cancel();
            }
        })
    };
    (token, watcher)
}

/// Run one job for a video on disk and print the outcome.
///
/// # Errors
///
/// Returns the pipeline error if the job failed.
pub(crate) async fn run_analyze(
    pipeline: &Pipeline,
    video: &Path,
    json: bool,
) -> anyhow::Result<()> {
    let (token, watcher) = interrupt_token();
    let result = pipeline.analyze(Upload::File(video), token).await;
    watcher.abort();
    let outcome = result?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome_json(&outcome))?);
    } else {
        print_outcome(&outcome);
    }
    Ok(())
}

fn describe(result: &ClassificationResult) -> String {
    match result {
        Ok(Classification { label, score, .. }) => format!("{label} ({score:.2})"),
        Err(e) => format!("unavailable: {}", e.message),
    }
}

fn print_outcome(outcome: &JobOutcome) {
    println!("job:        {}", outcome.job.id);
    println!("status:     {}", outcome.status());
    match &outcome.video_info {
        Some(info) => println!(
            "video:      {}x{} {} frames @ {} fps ({} min)",
            info.width, info.height, info.frame_count, info.fps, info.duration_minutes
        ),
        None => println!("video:      metadata unavailable"),
    }
    println!("segments:   {}", outcome.segments.len());
    println!("sentiment:  {}", describe(&outcome.assessment.sentiment));
    println!("toxicity:   {}", describe(&outcome.assessment.harmful_content));
    if let Some(path) = &outcome.summary_path {
        println!("summary:    {}", path.display());
    }
    if let Some(url) = &outcome.record.audio_url {
        println!("audio url:  {url}");
    }

    println!();
    if outcome.issues.is_empty() {
        println!("no issues detected");
    } else {
        println!("{:<10}{:<22}SCORE", "AT", "CATEGORY");
        for issue in &outcome.issues {
            let score = issue
                .score
                .map_or_else(|| "-".to_string(), |s| format!("{s:.2}"));
            println!("{:<10}{:<22}{score}", issue.timestamp, issue.category.as_str());
        }
    }

    if outcome.classification_failures > 0 {
        println!(
            "\n{} segment(s) could not be classified",
            outcome.classification_failures
        );
    }
    for degradation in &outcome.degradations {
        println!("warning: {degradation}");
    }
}

fn outcome_json(outcome: &JobOutcome) -> serde_json::Value {
    json!({
        "record": outcome.record,
        "issues": outcome.issues,
        "videoInfo": outcome.video_info,
        "summaryPath": outcome.summary_path,
        "metadataPath": outcome.metadata_path,
        "transcript": outcome.transcript,
        "assessment": {
            "sentiment": outcome.assessment.sentiment.as_ref().ok(),
            "harmfulContent": outcome.assessment.harmful_content.as_ref().ok(),
        },
        "classificationFailures": outcome.classification_failures,
        "degradations": outcome
            .degradations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>(),
    })
}

/// Transcribe an audio file and print text or segments.
///
/// # Errors
///
/// Returns the transcription error if recognition fails or yields nothing.
pub(crate) async fn run_transcribe(
    transcriber: &Transcriber,
    audio: &Path,
    timestamps: bool,
) -> anyhow::Result<()> {
    if timestamps {
        for segment in transcriber.transcribe_with_timestamps(audio).await? {
            println!(
                "[{} - {}] {}",
                format_timestamp(segment.start_seconds),
                format_timestamp(segment.end_seconds),
                segment.text
            );
        }
    } else {
        println!("{}", transcriber.transcribe(audio).await?);
    }
    Ok(())
}

/// Regenerate the summary of an existing job.
///
/// # Errors
///
/// Returns an error if the job id is malformed or the pipeline fails.
pub(crate) async fn run_summarize(
    pipeline: &Pipeline,
    job_id: &str,
    audio: &Path,
) -> anyhow::Result<()> {
    let job_id = job_id.parse()?;
    let outcome = pipeline.summarize_existing(job_id, audio).await?;
    println!(
        "summary written to {} ({} issue(s))",
        outcome.summary_path.display(),
        outcome.issues.len()
    );
    if outcome.classification_failures > 0 {
        println!(
            "{} segment(s) could not be classified",
            outcome.classification_failures
        );
    }
    Ok(())
}
