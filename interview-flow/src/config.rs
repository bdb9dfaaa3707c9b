//! Engine configuration: per-survey rules and location timeouts.
//!
//! ```toml
//! [location]
//! network_timeout_ms = 8000
//!
//! [[surveys]]
//! survey_id = "ac-tracker-2025"
//! reorder = [{ question_number = "5" }, { question_number = "3", sub_question = "a" }]
//!
//! [surveys.bye_election]
//! question_number = "16"
//! constituencies = ["Basirhat Dakshin"]
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{ConfigError, LocationSource, SurveyRules};

/// Environment variable naming the config file.
pub const CONFIG_ENV_VAR: &str = "INTERVIEW_FLOW_CONFIG";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub surveys: Vec<SurveyRules>,

    #[serde(default)]
    pub location: LocationConfig,
}

impl EngineConfig {
    /// Parse and check a TOML config.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        let mut seen = HashSet::new();
        for rules in &config.surveys {
            if !seen.insert(rules.survey_id.as_str()) {
                return Err(ConfigError::DuplicateSurvey(rules.survey_id.clone()));
            }
        }
        Ok(config)
    }

    /// Load a TOML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), surveys = config.surveys.len(), "loaded engine config");
        Ok(config)
    }

    /// Resolve the config in priority order:
    /// 1. Explicit path (command-line argument)
    /// 2. `INTERVIEW_FLOW_CONFIG` environment variable
    /// 3. Built-in defaults (no survey rules)
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load(&PathBuf::from(path));
        }
        debug!("no config file given, using defaults");
        Ok(Self::default())
    }

    /// Rules registered for `survey_id`.
    pub fn rules_for(&self, survey_id: &str) -> Option<&SurveyRules> {
        self.surveys.iter().find(|rules| rules.survey_id == survey_id)
    }
}

/// Per-strategy timeouts for location acquisition, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub network_timeout_ms: u64,
    pub gps_timeout_ms: u64,
    pub maps_timeout_ms: u64,
    pub manual_timeout_ms: u64,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            network_timeout_ms: 10_000,
            gps_timeout_ms: 15_000,
            maps_timeout_ms: 10_000,
            manual_timeout_ms: 120_000,
        }
    }
}

impl LocationConfig {
    /// Timeout for a strategy of the given source.
    pub fn timeout(&self, source: LocationSource) -> Duration {
        let ms = match source {
            LocationSource::Network => self.network_timeout_ms,
            LocationSource::Gps => self.gps_timeout_ms,
            LocationSource::MapsService => self.maps_timeout_ms,
            LocationSource::Manual => self.manual_timeout_ms,
        };
        Duration::from_millis(ms)
    }
}
