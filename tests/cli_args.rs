// tests/cli_args.rs

mod common;
use crate::common::TestResult;

use std::path::Path;

use clap::Parser;

use pipetest::cli::CliArgs;
use pipetest::config::default_config_path;
use pipetest::types::LogLevel;

#[test]
fn defaults_run_everything() -> TestResult {
    let args = CliArgs::try_parse_from(["pipetest"])?;
    assert_eq!(args.config, default_config_path());
    assert!(args.labels.is_empty());
    assert!(!args.dry_run);
    assert_eq!(args.log_level, None);
    Ok(())
}

#[test]
fn overrides_and_labels_are_parsed() -> TestResult {
    let args = CliArgs::try_parse_from([
        "pipetest",
        "--config",
        "ci.toml",
        "--testdir",
        "tests",
        "--poll-interval-ms",
        "20",
        "--expected-count",
        "7",
        "--log-level",
        "debug",
        "m.C",
        "n",
    ])?;
    assert_eq!(args.config, Path::new("ci.toml"));
    assert_eq!(args.testdir.as_deref(), Some("tests"));
    assert_eq!(args.poll_interval_ms, Some(20));
    assert_eq!(args.expected_count, Some(7));
    assert_eq!(args.log_level, Some(LogLevel::Debug));
    assert_eq!(args.labels, vec!["m.C", "n"]);
    Ok(())
}

#[test]
fn log_level_names_parse_case_insensitively() {
    assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
    assert_eq!(" trace ".parse::<LogLevel>(), Ok(LogLevel::Trace));
    assert!("loud".parse::<LogLevel>().is_err());
}

#[tokio::test]
async fn dry_run_does_not_start_the_executor() -> TestResult {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, "[executor]\nprogram = \"/definitely/not/a/program\"\n")?;
    let path = file.path().to_str().ok_or("non-utf8 temp path")?;

    let args = CliArgs::try_parse_from(["pipetest", "--config", path, "--dry-run", "m.C"])?;
    assert!(pipetest::run(args).await?);
    Ok(())
}

#[tokio::test]
async fn invalid_config_is_reported_before_spawning() -> TestResult {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, "[executor]\nprogram = \"\"\n")?;
    let path = file.path().to_str().ok_or("non-utf8 temp path")?;

    let args = CliArgs::try_parse_from(["pipetest", "--config", path])?;
    let err = pipetest::run(args).await.unwrap_err();
    assert!(err.to_string().contains("program"));
    Ok(())
}
