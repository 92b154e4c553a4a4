//! `records` sub-commands: read-only views over stored analysis records.

use clap::Subcommand;
use clipaudit_db::{DbError, DEFAULT_COLLECTION};

/// Sub-commands available under `records`.
#[derive(Debug, Subcommand)]
pub enum RecordsCommands {
    /// List the most recent analysis records
    List {
        /// Maximum number of records to show
        #[arg(long, default_value = "20")]
        limit: i64,
        /// Document collection to read from
        #[arg(long, default_value = DEFAULT_COLLECTION)]
        collection: String,
    },
    /// Print the stored document for one job
    Show {
        job_id: String,
        /// Document collection to read from
        #[arg(long, default_value = DEFAULT_COLLECTION)]
        collection: String,
    },
}

/// Dispatch a `records` sub-command.
///
/// # Errors
///
/// Returns an error if the record does not exist or the query fails.
pub(crate) async fn run_records(
    pool: &sqlx::PgPool,
    command: RecordsCommands,
) -> anyhow::Result<()> {
    match command {
        RecordsCommands::List { limit, collection } => {
            run_records_list(pool, &collection, limit).await
        }
        RecordsCommands::Show { job_id, collection } => {
            run_records_show(pool, &collection, &job_id).await
        }
    }
}

async fn run_records_list(
    pool: &sqlx::PgPool,
    collection: &str,
    limit: i64,
) -> anyhow::Result<()> {
    let rows = clipaudit_db::list_documents(pool, collection, limit).await?;

    if rows.is_empty() {
        println!("no records found in {collection}; run `analyze` first");
        return Ok(());
    }

    let header = format!(
        "{:<38}{:<12}{:<22}{:<12}VIDEO",
        "JOB", "STATUS", "UPLOADED", "MINUTES"
    );
    println!("{header}");
    for row in &rows {
        let (minutes, video) = match row.record() {
            Ok(record) => (
                record.video_info.map_or_else(
                    || "\u{2014}".to_string(),
                    |v| format!("{:.2}", v.duration_minutes),
                ),
                record.source_video_path,
            ),
            Err(e) => {
                tracing::warn!(
                    job_id = %row.job_id,
                    error = %e,
                    "stored document does not decode"
                );
                ("\u{2014}".to_string(), "<unreadable document>".to_string())
            }
        };
        println!(
            "{:<38}{:<12}{:<22}{:<12}{}",
            row.job_id,
            row.status,
            row.created_at.format("%Y-%m-%d %H:%M:%S"),
            minutes,
            video
        );
    }

    Ok(())
}

async fn run_records_show(
    pool: &sqlx::PgPool,
    collection: &str,
    job_id: &str,
) -> anyhow::Result<()> {
    let row = match clipaudit_db::get_document(pool, collection, job_id).await {
        Ok(row) => row,
        Err(DbError::NotFound) => {
            anyhow::bail!("no record for job '{job_id}' in {collection}");
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", serde_json::to_string_pretty(&row.document)?);
    Ok(())
}
