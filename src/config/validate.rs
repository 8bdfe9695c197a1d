// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{PipetestError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = PipetestError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.executor, raw.runner))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_executor(cfg)?;
    validate_runner(cfg)?;
    Ok(())
}

fn validate_executor(cfg: &RawConfigFile) -> Result<()> {
    if cfg.executor.program.trim().is_empty() {
        return Err(PipetestError::ConfigError(
            "[executor].program must not be empty".to_string(),
        ));
    }
    if cfg.executor.testdir_flag.trim().is_empty() {
        return Err(PipetestError::ConfigError(
            "[executor].testdir_flag must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_runner(cfg: &RawConfigFile) -> Result<()> {
    if cfg.runner.poll_interval_ms == 0 {
        return Err(PipetestError::ConfigError(
            "[runner].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.runner.testdir.is_empty() {
        return Err(PipetestError::ConfigError(
            "[runner].testdir must not be empty".to_string(),
        ));
    }
    Ok(())
}
