//! Configuration file
//!
//! ```json
//! {
//!   "alias_table": "aliases.json",
//!   "catalog": "catalog.json",
//!   "max_evidence_spans": 50,
//!   "required_slots": ["amount"],
//!   "log_level": "info"
//! }
//! ```
//!
//! Relative paths are resolved against the directory holding the config
//! file.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::errors::{CliError, CliResult};
use crate::decision::DEFAULT_MAX_EVIDENCE_SPANS;
use crate::observability::Severity;
use crate::pipeline::{PipelineSettings, RequiredSlot};

/// Upper bound for `max_evidence_spans`
pub const MAX_EVIDENCE_SPANS_LIMIT: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Alias table JSON file (required)
    pub alias_table: String,

    /// Catalog JSON file; the built-in cancer catalog when absent
    #[serde(default)]
    pub catalog: Option<String>,

    #[serde(default = "default_max_evidence_spans")]
    pub max_evidence_spans: usize,

    #[serde(default = "default_required_slots")]
    pub required_slots: Vec<String>,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Directory of the config file, for resolving relative paths
    #[serde(skip)]
    base_dir: PathBuf,
}

fn default_max_evidence_spans() -> usize {
    DEFAULT_MAX_EVIDENCE_SPANS
}
fn default_required_slots() -> Vec<String> {
    vec!["amount".to_string()]
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load and validate configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let mut config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.alias_table.trim().is_empty() {
            return Err(CliError::config_error("alias_table must not be empty"));
        }

        if self.max_evidence_spans == 0 || self.max_evidence_spans > MAX_EVIDENCE_SPANS_LIMIT {
            return Err(CliError::config_error(format!(
                "max_evidence_spans must be between 1 and {}, got {}",
                MAX_EVIDENCE_SPANS_LIMIT, self.max_evidence_spans
            )));
        }

        self.slots()?;
        self.severity()?;
        Ok(())
    }

    pub fn alias_table_path(&self) -> PathBuf {
        self.resolve(&self.alias_table)
    }

    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.catalog.as_deref().map(|c| self.resolve(c))
    }

    /// Required slots, parsed and deduplicated in config order.
    pub fn slots(&self) -> CliResult<Vec<RequiredSlot>> {
        let mut slots = Vec::with_capacity(self.required_slots.len());
        for name in &self.required_slots {
            let slot: RequiredSlot = name.parse().map_err(CliError::config_error)?;
            if !slots.contains(&slot) {
                slots.push(slot);
            }
        }
        Ok(slots)
    }

    pub fn severity(&self) -> CliResult<Severity> {
        self.log_level.parse().map_err(CliError::config_error)
    }

    pub fn pipeline_settings(&self) -> CliResult<PipelineSettings> {
        Ok(PipelineSettings {
            max_evidence_spans: self.max_evidence_spans,
            required_slots: self.slots()?,
        })
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.base_dir.join(p)
        }
    }
}
