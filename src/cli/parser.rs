use crate::result::{Result, StepError};
use std::path::PathBuf;

pub struct CliParser;

impl CliParser {
    pub fn validate_config_path(path: &str) -> Result<PathBuf> {
        let config_path = PathBuf::from(path);

        if !config_path.exists() {
            return Err(StepError::config(format!("Config file not found: {}", path)));
        }

        if !config_path.is_file() {
            return Err(StepError::config(format!("Config path is not a file: {}", path)));
        }

        Ok(config_path)
    }
}
