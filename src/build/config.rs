use crate::result::{Result, StepError};
use crate::scanner::DirectiveSyntax;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Default file name looked up by the command-line client.
pub const CONFIG_FILE: &str = "stepbuild.toml";

/** What the engine does after a step fails
 *
 * - `AbortOnFirst`: stop immediately and return the failure
 * - `KeepGoing`: skip every step depending on a failed one, keep building
 *   independent branches, then return all failures together
 */
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    #[default]
    AbortOnFirst,
    KeepGoing,
}

/// Engine settings. Graph contents are always declared in code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub failure_policy: FailurePolicy,
    pub dry_run: bool,
    pub directive: DirectiveSyntax,
}

impl EngineConfig {
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path).await?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;

        config.validate()?;
        Ok(config)
    }

    pub async fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            StepError::Config(format!("Failed to serialize engine config: {}", e).into())
        })?;

        fs::write(path, content).await?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.directive.validate()
    }
}
