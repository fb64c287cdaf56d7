//! Logging setup for the errlens binary
//!
//! Log lines go to stderr so that a report written to stdout stays valid
//! JSON. `RUST_LOG` takes precedence over the configured level.

use crate::config::LoggingConfig;
use tracing_subscriber::{fmt, EnvFilter};

/// Output layouts accepted by `logging.format`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Multi-line human-readable events
    Pretty,
    /// One terse line per event
    Compact,
    /// Newline-delimited JSON
    Json,
}

impl LogFormat {
    pub const NAMES: [&'static str; 3] = ["pretty", "compact", "json"];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "pretty" => Some(LogFormat::Pretty),
            "compact" => Some(LogFormat::Compact),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Initialize the global subscriber
///
/// `verbose` raises the crate's default level to debug. An unknown format
/// falls back to pretty output.
pub fn init_logging(config: &LoggingConfig, verbose: bool) {
    let fallback = if verbose {
        "errlens=debug".to_string()
    } else {
        config.level.clone()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let builder = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match LogFormat::parse(&config.format).unwrap_or(LogFormat::Pretty) {
        LogFormat::Json => builder.json().init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_format_is_pretty() {
        let config = LoggingConfig::default();
        assert_eq!(LogFormat::parse(&config.format), Some(LogFormat::Pretty));
    }

    #[test]
    fn test_every_listed_name_parses() {
        for name in LogFormat::NAMES {
            assert!(LogFormat::parse(name).is_some(), "{} should parse", name);
        }
        assert_eq!(LogFormat::parse("full"), None);
        assert_eq!(LogFormat::parse("JSON"), None);
    }
}
