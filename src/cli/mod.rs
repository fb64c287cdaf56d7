//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "errlens",
    version,
    author = "neur0map",
    about = "Error-analysis reports for API gateway log exports",
    long_about = "errlens reads a CSV export of API gateway logs and reports which client SDKs \
                  are failing, with which error codes, on which operations, and which SDK \
                  versions are deployed."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/errlens/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a log export and print the JSON report
    Analyze {
        /// CSV export to analyze
        file: PathBuf,

        /// Write the report to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Only analyze rows of this product (e.g. "chat")
        #[arg(short, long)]
        product: Option<String>,

        /// Error code table (TOML with [[code]] entries)
        #[arg(long, value_name = "FILE")]
        codes: Option<PathBuf>,

        /// Emit single-line JSON
        #[arg(long)]
        compact: bool,
    },

    /// Check that a log export has every required column
    Validate {
        /// CSV export to check
        file: PathBuf,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,

    /// Print the configuration file path
    Path,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "errlens",
            "analyze",
            "logs.csv",
            "--product",
            "chat",
            "--compact",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze {
                file,
                product,
                compact,
                output,
                codes,
            } => {
                assert_eq!(file, PathBuf::from("logs.csv"));
                assert_eq!(product.as_deref(), Some("chat"));
                assert!(compact);
                assert!(output.is_none());
                assert!(codes.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["errlens", "validate", "logs.csv", "-v", "-c", "cfg.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("cfg.toml")));
    }

    #[test]
    fn test_config_subcommands() {
        let cli = Cli::try_parse_from(["errlens", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Init { force: true }
            }
        ));
    }
}
