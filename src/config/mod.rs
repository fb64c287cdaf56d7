//! Configuration management for errlens
//!
//! This module handles loading, validation, and environment overrides of
//! the TOML configuration file.

use crate::analysis::AnalysisOptions;
use crate::codes::ErrorCodeTable;
use crate::error::{ErrlensError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

mod validator;

pub use validator::ConfigValidator;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub codes: CodesConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Log export reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// CSV field delimiter, a single ASCII character
    pub delimiter: String,
    /// Only analyse rows of this product
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            delimiter: ",".to_string(),
            product: None,
        }
    }
}

/// Error code table source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodesConfig {
    /// TOML file with `[[code]]` entries
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Use only the file's entries instead of layering them over the built-in table
    #[serde(default)]
    pub replace_builtin: bool,
}

/// Analysis tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Row count from which runs are sharded (`parallel` feature)
    pub parallel_min_rows: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            parallel_min_rows: AnalysisOptions::default().parallel_min_rows,
        }
    }
}

/// Report output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print the JSON report
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Logging setup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    /// "pretty", "compact" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "errlens=info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ErrlensError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ErrlensError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Load the given file, or the default file when it exists, or defaults
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }

        let default_path = Self::default_path()?;
        if default_path.exists() {
            return Self::load(&default_path);
        }

        let mut config = Self::default();
        config.apply_env_overrides();
        ConfigValidator::validate(&config)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ErrlensError::Io {
                source: e,
                context: format!("Failed to create config directory: {:?}", parent),
            })?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ErrlensError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: ERRLENS_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("ERRLENS_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "INPUT__DELIMITER" => {
                self.input.delimiter = value.to_string();
            }
            "INPUT__PRODUCT" => {
                self.input.product = Some(value.to_string()).filter(|p| !p.is_empty());
            }
            "CODES__FILE" => {
                self.codes.file = Some(PathBuf::from(value));
            }
            "OUTPUT__PRETTY" => {
                self.output.pretty =
                    value.parse().map_err(|_| ErrlensError::InvalidConfigValue {
                        path: path.to_string(),
                        message: format!("Cannot parse '{}' as boolean", value),
                    })?;
            }
            "ANALYSIS__PARALLEL_MIN_ROWS" => {
                self.analysis.parallel_min_rows =
                    value.parse().map_err(|_| ErrlensError::InvalidConfigValue {
                        path: path.to_string(),
                        message: format!("Cannot parse '{}' as a row count", value),
                    })?;
            }
            "LOGGING__LEVEL" => {
                self.logging.level = value.to_string();
            }
            "LOGGING__FORMAT" => {
                self.logging.format = value.to_string();
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// CSV delimiter as a byte
    pub fn delimiter(&self) -> Result<u8> {
        match self.input.delimiter.as_bytes() {
            [b] if b.is_ascii() => Ok(*b),
            _ => Err(ErrlensError::InvalidConfigValue {
                path: "input.delimiter".to_string(),
                message: format!(
                    "Delimiter must be one ASCII character, got '{}'",
                    self.input.delimiter
                ),
            }),
        }
    }

    /// Build the error code table this configuration describes
    pub fn error_code_table(&self) -> Result<ErrorCodeTable> {
        let Some(path) = &self.codes.file else {
            return Ok(ErrorCodeTable::builtin());
        };

        let file = ErrorCodeTable::read_config(path)?;
        let mut table = if self.codes.replace_builtin {
            ErrorCodeTable::empty()
        } else {
            ErrorCodeTable::builtin()
        };
        table.extend(file)?;
        tracing::debug!(path = ?path, codes = table.len(), "Loaded error code table");
        Ok(table)
    }

    /// Analysis options for this configuration
    pub fn analysis_options(&self) -> AnalysisOptions {
        AnalysisOptions {
            product: self.input.product.clone(),
            parallel_min_rows: self.analysis.parallel_min_rows,
        }
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ErrlensError::Config("Cannot determine config directory".to_string())
        })?;

        Ok(config_dir.join("errlens").join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
            },
            input: InputConfig::default(),
            codes: CodesConfig::default(),
            analysis: AnalysisConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
