use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["clipaudit", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["clipaudit", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["clipaudit"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn analyze_defaults_to_persisted_text_output() {
    let cli = Cli::try_parse_from(["clipaudit", "analyze", "clip.mp4"]).unwrap();
    match cli.command {
        Some(Commands::Analyze {
            video,
            dry_run,
            json,
        }) => {
            assert_eq!(video, PathBuf::from("clip.mp4"));
            assert!(!dry_run);
            assert!(!json);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn analyze_accepts_dry_run_and_json() {
    let cli =
        Cli::try_parse_from(["clipaudit", "analyze", "clip.mov", "--dry-run", "--json"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Analyze {
            dry_run: true,
            json: true,
            ..
        })
    ));
}

#[test]
fn analyze_requires_a_video_path() {
    assert!(Cli::try_parse_from(["clipaudit", "analyze"]).is_err());
}

#[test]
fn transcribe_with_timestamps() {
    let cli =
        Cli::try_parse_from(["clipaudit", "transcribe", "audio.mp3", "--timestamps"]).unwrap();
    match cli.command {
        Some(Commands::Transcribe { audio, timestamps }) => {
            assert_eq!(audio, PathBuf::from("audio.mp3"));
            assert!(timestamps);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn summarize_takes_job_id_and_audio() {
    let cli = Cli::try_parse_from([
        "clipaudit",
        "summarize",
        "0192f6a0-7c1e-7d3a-9b1e-2f4c5d6e7f80",
        "audio.mp3",
    ])
    .unwrap();
    match cli.command {
        Some(Commands::Summarize { job_id, audio }) => {
            assert_eq!(job_id, "0192f6a0-7c1e-7d3a-9b1e-2f4c5d6e7f80");
            assert_eq!(audio, PathBuf::from("audio.mp3"));
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn records_list_defaults() {
    let cli = Cli::try_parse_from(["clipaudit", "records", "list"]).unwrap();
    match cli.command {
        Some(Commands::Records {
            command: RecordsCommands::List { limit, collection },
        }) => {
            assert_eq!(limit, 20);
            assert_eq!(collection, "videoMetadata");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn records_show_with_collection_override() {
    let cli = Cli::try_parse_from([
        "clipaudit",
        "records",
        "show",
        "abc123",
        "--collection",
        "archive",
    ])
    .unwrap();
    match cli.command {
        Some(Commands::Records {
            command: RecordsCommands::Show { job_id, collection },
        }) => {
            assert_eq!(job_id, "abc123");
            assert_eq!(collection, "archive");
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn records_list_rejects_non_numeric_limit() {
    assert!(Cli::try_parse_from(["clipaudit", "records", "list", "--limit", "many"]).is_err());
}
