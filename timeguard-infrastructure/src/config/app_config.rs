use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use timeguard_domain::{AuditSettings, DEFAULT_MAX_ENTRIES, DEFAULT_THRESHOLD_SECONDS};

use crate::config::validate_positive;

pub const CONFIG_PATH_ENV: &str = "TIMEGUARD_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "./timeguard.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub threshold_seconds: u64,
    pub max_entries: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            threshold_seconds: DEFAULT_THRESHOLD_SECONDS,
            max_entries: DEFAULT_MAX_ENTRIES as u64,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let file_path = Path::new(&path);
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path)
                .with_context(|| format!("failed to read {}", file_path.display()))?;
            let config = Self::from_toml_str(&content)
                .with_context(|| format!("invalid config file {}", file_path.display()))?;
            info!(path = %file_path.display(), "loaded config");
            config
        } else {
            warn!(path = %file_path.display(), "config file not found, using defaults");
            AppConfig::default()
        };
        config.apply_overrides(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("TIMEGUARD_THRESHOLD_SECONDS") {
            self.threshold_seconds = parse_or_warn(&value, self.threshold_seconds);
        }
        if let Some(value) = lookup("TIMEGUARD_MAX_ENTRIES") {
            self.max_entries = parse_or_warn(&value, self.max_entries);
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_positive("threshold_seconds", self.threshold_seconds)?;
        validate_positive("max_entries", self.max_entries)?;
        Ok(())
    }

    pub fn to_audit_settings(&self) -> AuditSettings {
        let max_entries = usize::try_from(self.max_entries).unwrap_or(usize::MAX);
        AuditSettings::new(self.threshold_seconds, max_entries)
    }
}

fn parse_or_warn(value: &str, fallback: u64) -> u64 {
    match value.trim().parse() {
        Ok(parsed) => parsed,
        Err(err) => {
            warn!(value, "ignoring invalid override: {}", err);
            fallback
        }
    }
}
