use errlens::cli::{Cli, Commands, ConfigAction};
use errlens::config::{Config, ConfigValidator};
use errlens::error::{ErrlensError, Result};
use errlens::logging::init_logging;
use errlens::records::{validate_headers, CsvSource};
use errlens::Analyzer;
use std::path::{Path, PathBuf};

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // `config init` and `config path` must work before any file exists
    let config = match &cli.command {
        Commands::Config {
            action: ConfigAction::Init { .. } | ConfigAction::Path,
        } => Config::default(),
        _ => Config::resolve(cli.config.as_deref())?,
    };

    // Initialize logging
    init_logging(&config.logging, cli.verbose);

    // Handle commands
    match cli.command {
        Commands::Analyze {
            file,
            output,
            product,
            codes,
            compact,
        } => {
            cmd_analyze(config, &file, output, product, codes, compact)?;
        }
        Commands::Validate { file } => {
            cmd_validate(&config, &file)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, config, action)?;
        }
    }

    Ok(())
}

fn cmd_analyze(
    mut config: Config,
    file: &Path,
    output: Option<PathBuf>,
    product: Option<String>,
    codes: Option<PathBuf>,
    compact: bool,
) -> Result<()> {
    // CLI flags take precedence over the file and the environment
    if product.is_some() {
        config.input.product = product;
    }
    if codes.is_some() {
        config.codes.file = codes;
    }
    if compact {
        config.output.pretty = false;
    }
    ConfigValidator::validate(&config)?;

    let table = config.error_code_table()?;
    let source = CsvSource::new(config.delimiter()?);

    tracing::info!(file = ?file, "Reading log export");
    let set = source.read_path(file)?;

    let analyzer = Analyzer::new(table, config.analysis_options());
    let (report, stats) = analyzer.run(&set)?;

    if let Some(window) = &report.time_window {
        tracing::info!(
            start = %window.start,
            end = %window.end,
            span = %window.duration_label(),
            "Time window"
        );
    }
    tracing::info!(
        input_rows = stats.input_rows,
        analysed_rows = stats.analysed_rows,
        distinct_apps = stats.distinct_apps,
        unparsed_timestamps = stats.unparsed_timestamps,
        sharded = stats.sharded,
        "Run statistics"
    );

    let json = if config.output.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .map_err(|e| ErrlensError::Json {
        source: e,
        context: "Failed to serialize report".to_string(),
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, format!("{}\n", json)).map_err(|e| ErrlensError::Io {
                source: e,
                context: format!("Failed to write report: {:?}", path),
            })?;
            eprintln!("✓ Report written to: {}", path.display());
            eprintln!(
                "  {} errors in {} groups ({} rows analysed)",
                report.total_errors,
                report.error_groups.len(),
                stats.analysed_rows
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn cmd_validate(config: &Config, file: &Path) -> Result<()> {
    let source = CsvSource::new(config.delimiter()?);
    let headers = source.read_headers(file)?;
    validate_headers(&headers)?;
    let rows = source.count_rows(file)?;

    println!("✓ {} has every required column", file.display());
    println!("  Rows: {}", rows);
    println!("  Columns: {}", headers.join(", "));
    Ok(())
}

fn cmd_config(config_path: Option<PathBuf>, config: Config, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml = toml::to_string_pretty(&config)?;
            println!("{}", toml);
        }
        ConfigAction::Path => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };
            println!("{}", path.display());
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            Config::default().save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}
