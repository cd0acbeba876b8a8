use crate::error::{BoardError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;

/// Board configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    /// Titles given to the three columns when a fresh board is created
    pub column_titles: [String; 3],
    /// Key under which key/value stores keep the board snapshot
    pub storage_key: String,
}

impl BoardConfig {
    pub const DEFAULT_STORAGE_KEY: &'static str = "noteAppData";

    /// Reads a JSON config file, falling back to defaults when it doesn't exist
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            log::debug!(
                "[notes.config] No config at {:?}, using defaults",
                path
            );
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).await?;
        let config: BoardConfig = serde_json::from_str(&contents)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(pos) = self.column_titles.iter().position(|t| t.trim().is_empty()) {
            return Err(BoardError::ConfigError(format!(
                "column title {} is empty",
                pos + 1
            )));
        }
        if self.storage_key.trim().is_empty() {
            return Err(BoardError::ConfigError(
                "storage key is empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            column_titles: [
                "Column 1 (max 3)".to_string(),
                "Column 2 (max 5)".to_string(),
                "Unlimited".to_string(),
            ],
            storage_key: Self::DEFAULT_STORAGE_KEY.to_string(),
        }
    }
}
