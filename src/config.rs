//! Layered configuration loading using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`ECN_PATHDEP_*` prefix, `__` as separator)
//! 2. File given with `--config`
//! 3. `ecn-pathdep.toml` in the working directory
//! 4. Built-in defaults
//!
//! `ECN_PATHDEP_PIPELINE__MIN_SOURCES=3` maps to `pipeline.min_sources`.

use crate::schema::{RevisionOrder, Variant};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_PREFIX: &str = "ECN_PATHDEP_";
pub const LOCAL_CONFIG_FILE: &str = "ecn-pathdep.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    #[error("Configuration file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

const fn default_min_sources() -> usize {
    5
}

const fn default_min_locations() -> usize {
    4
}

const fn default_min_supported_records() -> usize {
    2
}

const fn default_min_record_support() -> u64 {
    2
}

const fn default_batch_size() -> usize {
    1000
}

/// Thresholds and policy of the classification pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub variant: Variant,

    /// Distinct source vantage points a path-level group needs.
    #[serde(default = "default_min_sources")]
    pub min_sources: usize,

    /// Distinct locations a super-aggregate group needs.
    #[serde(default = "default_min_locations")]
    pub min_locations: usize,

    /// Well-supported aggregate records a super-aggregate group needs.
    #[serde(default = "default_min_supported_records")]
    pub min_supported_records: usize,

    /// Underlying measurements an aggregate record needs to count at all.
    #[serde(default = "default_min_record_support")]
    pub min_record_support: u64,

    #[serde(default)]
    pub revision_order: RevisionOrder,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            variant: Variant::default(),
            min_sources: default_min_sources(),
            min_locations: default_min_locations(),
            min_supported_records: default_min_supported_records(),
            min_record_support: default_min_record_support(),
            revision_order: RevisionOrder::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EmitConfig {
    /// Results per sink write.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub emit: EmitConfig,
}

impl Config {
    /// Load from all sources and validate.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        // Toml::file silently skips missing files; an explicit path must exist.
        if let Some(path) = explicit
            && !path.exists()
        {
            return Err(ConfigError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let config: Self = Self::figment(explicit).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the provider chain. Public so tests can layer providers on top.
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            figment = figment.merge(Toml::file(local));
        }

        if let Some(path) = explicit {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("pipeline.min_sources", self.pipeline.min_sources as u64),
            ("pipeline.min_locations", self.pipeline.min_locations as u64),
            (
                "pipeline.min_supported_records",
                self.pipeline.min_supported_records as u64,
            ),
            ("pipeline.min_record_support", self.pipeline.min_record_support),
            ("emit.batch_size", self.emit.batch_size as u64),
        ];
        for (field, value) in checks {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = Config::default();
        assert_eq!(config.pipeline.variant, Variant::Path);
        assert_eq!(config.pipeline.min_sources, 5);
        assert_eq!(config.pipeline.min_locations, 4);
        assert_eq!(config.pipeline.min_supported_records, 2);
        assert_eq!(config.pipeline.min_record_support, 2);
        assert_eq!(config.pipeline.revision_order, RevisionOrder::NewestFirst);
        assert_eq!(config.emit.batch_size, 1000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut config = Config::default();
        config.emit.batch_size = 0;
        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => assert_eq!(field, "emit.batch_size"),
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }
}
