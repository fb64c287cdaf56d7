use crate::config::Config;
use crate::error::{ErrlensError, Result, ValidationError};
use crate::logging::LogFormat;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration
    pub fn validate(config: &Config) -> Result<()> {
        let mut errors = Vec::new();

        // Validate schema version
        Self::validate_schema_version(config, &mut errors);

        // Validate input settings
        Self::validate_input(config, &mut errors);

        // Validate error code source
        Self::validate_codes(config, &mut errors);

        // Validate analysis settings
        Self::validate_analysis(config, &mut errors);

        // Validate logging settings
        Self::validate_logging(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ErrlensError::ConfigValidation { errors })
        }
    }

    fn validate_schema_version(config: &Config, errors: &mut Vec<ValidationError>) {
        let version = &config.meta.schema_version;
        if version != "1.0.0" {
            errors.push(ValidationError::new(
                "_meta.schema_version",
                format!("Unsupported schema version: {}", version),
            ));
        }
    }

    fn validate_input(config: &Config, errors: &mut Vec<ValidationError>) {
        if let Err(e) = config.delimiter() {
            errors.push(ValidationError::new("input.delimiter", e.to_string()));
        }

        if let Some(product) = &config.input.product {
            if product.trim().is_empty() {
                errors.push(ValidationError::new(
                    "input.product",
                    "Product filter cannot be empty",
                ));
            }
        }
    }

    fn validate_codes(config: &Config, errors: &mut Vec<ValidationError>) {
        // File existence is checked when the table is loaded
        match &config.codes.file {
            Some(path) if path.as_os_str().is_empty() => {
                errors.push(ValidationError::new(
                    "codes.file",
                    "Error code file path cannot be empty",
                ));
            }
            None if config.codes.replace_builtin => {
                errors.push(ValidationError::new(
                    "codes.replace_builtin",
                    "replace_builtin requires codes.file",
                ));
            }
            _ => {}
        }
    }

    fn validate_analysis(config: &Config, errors: &mut Vec<ValidationError>) {
        if config.analysis.parallel_min_rows == 0 {
            errors.push(ValidationError::new(
                "analysis.parallel_min_rows",
                "Parallel row threshold must be greater than 0",
            ));
        }
    }

    fn validate_logging(config: &Config, errors: &mut Vec<ValidationError>) {
        let format = &config.logging.format;
        if LogFormat::parse(format).is_none() {
            errors.push(ValidationError::new(
                "logging.format",
                format!(
                    "Format must be one of {:?}, got '{}'",
                    LogFormat::NAMES, format
                ),
            ));
        }

        if config.logging.level.trim().is_empty() {
            errors.push(ValidationError::new(
                "logging.level",
                "Log level cannot be empty",
            ));
        }
    }
}
