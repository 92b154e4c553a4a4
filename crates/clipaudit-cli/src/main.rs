mod analyze;
mod records;
mod wiring;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::records::RecordsCommands;

#[derive(Debug, Parser)]
#[command(name = "clipaudit")]
#[command(about = "Video transcript analysis: sentiment and harmful-content issue reports")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze a video end to end and persist its record
    Analyze {
        /// Path to an .mp4, .avi or .mov file
        video: PathBuf,
        /// Keep records in memory instead of the database
        #[arg(long)]
        dry_run: bool,
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Transcribe an audio file
    Transcribe {
        audio: PathBuf,
        /// Print timestamped segments instead of flat text
        #[arg(long)]
        timestamps: bool,
    },
    /// Regenerate the issue summary of an existing job from its audio
    Summarize { job_id: String, audio: PathBuf },
    /// Inspect stored analysis records
    Records {
        #[command(subcommand)]
        command: RecordsCommands,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check database connectivity
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = Arc::new(clipaudit_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let Some(command) = cli.command else {
        println!("clipaudit: no command given; see --help");
        return Ok(());
    };

    match command {
        Commands::Analyze {
            video,
            dry_run,
            json,
        } => {
            let store = if dry_run {
                wiring::memory_store()
            } else {
                let pool = connect(&config).await?;
                clipaudit_db::run_migrations(&pool).await?;
                wiring::pg_store(pool)
            };
            let pipeline = wiring::build_pipeline(&config, store)?;
            analyze::run_analyze(&pipeline, &video, json).await?;
        }
        Commands::Transcribe { audio, timestamps } => {
            let transcriber = wiring::build_transcriber(&config)?;
            analyze::run_transcribe(&transcriber, &audio, timestamps).await?;
        }
        Commands::Summarize { job_id, audio } => {
            let pipeline = wiring::build_pipeline(&config, wiring::memory_store())?;
            analyze::run_summarize(&pipeline, &job_id, &audio).await?;
        }
        Commands::Records { command } => {
            let pool = connect(&config).await?;
            records::run_records(&pool, command).await?;
        }
        Commands::Db { command } => {
            let pool = connect(&config).await?;
            match command {
                DbCommands::Migrate => {
                    let applied = clipaudit_db::run_migrations(&pool).await?;
                    println!("migrations up to date ({applied} applied)");
                }
                DbCommands::Ping => {
                    clipaudit_db::ping(&pool).await?;
                    println!("database reachable");
                }
            }
        }
    }

    Ok(())
}

async fn connect(config: &clipaudit_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = clipaudit_db::PoolConfig::from_app_config(config);
    let database_url = config.require_database_url()?;
    Ok(clipaudit_db::connect_pool(database_url, pool_config).await?)
}

#[cfg(test)]
mod tests;
