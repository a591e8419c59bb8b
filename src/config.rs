use std::path::Path;

use anyhow::{bail, Context};
use chrono::Duration;
use serde::Deserialize;

use crate::vocabulary::{SymptomTag, SymptomVocabulary};
use crate::window::default_horizon;

pub const CONFIG_ENV: &str = "BLOOMGUARD_CONFIG";

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub horizon: Duration,
    pub vocabulary: SymptomVocabulary,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            horizon: default_horizon(),
            vocabulary: SymptomVocabulary::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    horizon_hours: Option<i64>,
    concerning_tags: Option<Vec<SymptomTag>>,
    moderate_tags: Option<Vec<SymptomTag>>,
}

impl EngineConfig {
    /// Builds the config from an optional JSON file, falling back to `BLOOMGUARD_CONFIG`.
    /// A CLI horizon wins over the file.
    pub fn load(path: Option<&Path>, horizon_hours: Option<i64>) -> anyhow::Result<Self> {
        let env_path = std::env::var(CONFIG_ENV).ok();
        let path = path.map(Path::to_path_buf).or_else(|| env_path.map(Into::into));

        let file = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                Self::parse_file(&raw)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => ConfigFile::default(),
        };

        Self::from_parts(file, horizon_hours)
    }

    fn parse_file(raw: &str) -> anyhow::Result<ConfigFile> {
        Ok(serde_json::from_str(raw)?)
    }

    fn from_parts(file: ConfigFile, horizon_hours: Option<i64>) -> anyhow::Result<Self> {
        let defaults = Self::default();

        let horizon = match horizon_hours.or(file.horizon_hours) {
            Some(hours) if hours <= 0 => bail!("horizon_hours must be positive, got {hours}"),
            Some(hours) => Duration::try_hours(hours)
                .with_context(|| format!("horizon_hours {hours} is too large"))?,
            None => defaults.horizon,
        };

        let vocabulary = defaults
            .vocabulary
            .with_overrides(file.concerning_tags, file.moderate_tags);

        Ok(Self { horizon, vocabulary })
    }
}
