use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use shared::AppConfig;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Handed to the core unchanged via `Event::Configure`.
    #[serde(default)]
    pub app: AppConfig,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl CliConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: CliConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.app.validate()?;
        Ok(config)
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            app: AppConfig::default(),
        }
    }
}
