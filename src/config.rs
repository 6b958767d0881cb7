use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

pub const DEFAULT_URL: &str =
    "https://www.dropbox.com/s/shsvqzbe5c6ncbr/livermore1a.txt?dl=1";
pub const IN_MEMORY: &str = ":memory:";

/// Pipeline configuration. Every field falls back to the constants the
/// Livermore fungi loader was written against.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Where the tab-separated dataset is downloaded from
    pub url: String,
    /// Stage the fetched text through a uniquely named temporary file
    pub scratch_file: bool,
    /// Directory for the scratch file; `None` uses the system temp dir
    pub scratch_dir: Option<PathBuf>,
    /// Number of decoded characters kept from the response body
    pub max_chars: usize,
    /// Number of data rows taken after the header
    pub data_rows: usize,
    /// Number of leading fields discarded from every row
    pub drop_leading: usize,
    /// Replacement for empty fields
    pub blank_placeholder: String,
    /// Path to the SQLite database, or `:memory:`
    pub database: String,
    pub table_name: String,
    pub verify: VerifyConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            scratch_file: true,
            scratch_dir: None,
            max_chars: 1500,
            data_rows: 5,
            drop_leading: 2,
            blank_placeholder: "No data".to_string(),
            database: IN_MEMORY.to_string(),
            table_name: "FungiData".to_string(),
            verify: VerifyConfig::default(),
        }
    }
}

/// Columns used by the read-back queries
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Column selected across all rows
    pub column: String,
    /// Column selected for a single key
    pub lookup_column: String,
    pub key_column: String,
    pub key_value: i64,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            column: "SpeciesAsRecorded".to_string(),
            lookup_column: "Ecosystem".to_string(),
            key_column: "RecordKey".to_string(),
            key_value: 2,
        }
    }
}

impl PipelineConfig {
    /// Load a TOML config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_chars == 0 {
            return Err(PipelineError::Config("max_chars must be greater than zero".into()));
        }
        if self.data_rows == 0 {
            return Err(PipelineError::Config("data_rows must be greater than zero".into()));
        }
        Ok(())
    }
}
