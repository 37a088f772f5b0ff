//! Command-line interface for mongoframe
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Connection string and default database resolution
//! - Running one export and writing its output

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{Config, OutputFormat};
use crate::connection::{extract_database_from_uri, sanitize_uri};
use crate::error::{ConfigError, Result};
use crate::exporter::CollectionExporter;
use crate::formatter::Formatter;

/// Export a MongoDB collection as a table
#[derive(Parser, Debug)]
#[command(
    name = "mongoframe",
    version,
    about = "Export a MongoDB collection as a table",
    long_about = "Reads every document of a MongoDB collection in fixed-size batches, drops the
_id column, turns \"na\" values into missing cells and prints the result as a table, CSV or
JSON Lines."
)]
pub struct CliArgs {
    /// MongoDB connection URI
    ///
    /// Format: mongodb://[username:password@]host[:port][/database][?options]
    #[arg(value_name = "URI")]
    pub uri: Option<String>,

    /// Collection to export
    #[arg(short = 'C', long, value_name = "NAME")]
    pub collection: Option<String>,

    /// Database to read from (defaults to the URI path or config)
    #[arg(long, value_name = "NAME")]
    pub database: Option<String>,

    /// Documents per batch
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Value replaced with a missing cell (repeatable, replaces the configured list)
    #[arg(long = "sentinel", value_name = "VALUE")]
    pub sentinels: Vec<String>,

    /// Output format (table, csv, jsonl, summary)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Write output to a file instead of stdout
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Connection timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Disable the progress spinner
    #[arg(long)]
    pub no_progress: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Quiet mode (errors only)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (debug logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for mongoframe
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration
        #[arg(long)]
        validate: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Effective configuration
    config: Config,
}

impl CliInterface {
    /// Parse process arguments and load configuration
    pub fn new() -> Result<Self> {
        let args = CliArgs::parse();
        let config = Config::load(args.config_file.as_deref())?;
        Self::from_parts(args, config)
    }

    /// Build from already parsed arguments and a loaded configuration
    ///
    /// Arguments override configuration values; the result is validated.
    pub fn from_parts(args: CliArgs, mut config: Config) -> Result<Self> {
        Self::apply_args_to_config(&mut config, &args)?;
        config.validate()?;
        Ok(Self { args, config })
    }

    /// Apply CLI arguments to configuration
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) -> Result<()> {
        if let Some(uri) = &args.uri {
            config.connection.uri = uri.clone();
        }

        if let Some(database) = &args.database {
            config.connection.database = database.clone();
        } else if let Some(database) = args.uri.as_deref().and_then(extract_database_from_uri) {
            // Only a URI given on the command line outranks the database
            // already resolved from file and environment
            config.connection.database = database;
        }

        if let Some(timeout) = args.timeout {
            config.connection.timeout = timeout;
        }
        if let Some(batch_size) = args.batch_size {
            config.export.batch_size = batch_size;
        }
        if !args.sentinels.is_empty() {
            config.export.sentinels = args.sentinels.clone();
        }
        if let Some(format) = &args.format {
            config.display.format = format.parse::<OutputFormat>()?;
        }
        if args.no_progress || args.quiet {
            config.export.progress = false;
        }
        if args.no_color {
            config.display.color_output = false;
        }

        Ok(())
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if a subcommand ran and the program should exit
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Config { show, validate }) => {
                if *validate {
                    // Already validated while building the interface
                    println!("Configuration is valid");
                }
                if *show || !*validate {
                    println!("{}", self.sanitized_config_toml()?);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Effective configuration as TOML with credentials masked
    pub fn sanitized_config_toml(&self) -> Result<String> {
        let mut shown = self.config.clone();
        shown.connection.uri = sanitize_uri(&shown.connection.uri);
        shown.to_toml_string()
    }

    /// Connect, export the requested collection and write the output
    pub async fn run_export(&self) -> Result<()> {
        let collection = self
            .args
            .collection
            .as_deref()
            .ok_or_else(|| ConfigError::MissingField("--collection".to_string()))?;

        info!(
            "Exporting {} from {}",
            collection,
            sanitize_uri(&self.config.connection.uri)
        );

        let (table, stats) = CollectionExporter::connect(&self.config)
            .await?
            .export_and_close(collection, None)
            .await?;
        info!(
            "Exported {} rows x {} columns in {} ms ({} fragments, {} sentinel cells replaced)",
            table.num_rows(),
            table.num_columns(),
            stats.elapsed_ms,
            stats.fragment_rows.len(),
            stats.sentinels_replaced
        );

        let rendered = Formatter::from_config(&self.config.display).format(&table)?;
        match &self.args.output {
            Some(path) => write_output(path, &rendered).await?,
            None => println!("{}", rendered.trim_end_matches('\n')),
        }

        Ok(())
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }
}

async fn write_output(path: &Path, content: &str) -> Result<()> {
    tokio::fs::write(path, content).await?;
    info!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MongoframeError;

    fn interface(argv: &[&str]) -> Result<CliInterface> {
        let args = CliArgs::try_parse_from(argv).unwrap();
        CliInterface::from_parts(args, Config::default())
    }

    #[test]
    fn test_database_precedence() {
        let cli = interface(&["mongoframe", "mongodb://h/fromuri", "-C", "c"]).unwrap();
        assert_eq!(cli.config().connection.database, "fromuri");

        let cli = interface(&[
            "mongoframe",
            "mongodb://h/fromuri",
            "-C",
            "c",
            "--database",
            "explicit",
        ])
        .unwrap();
        assert_eq!(cli.config().connection.database, "explicit");

        let cli = interface(&["mongoframe", "-C", "c"]).unwrap();
        assert_eq!(cli.config().connection.database, "test");
    }

    #[test]
    fn test_env_database_beats_config_file_uri() {
        let mut config = Config::from_toml_str(
            r#"
            [connection]
            uri = "mongodb://h:27017/filedb"
            "#,
        )
        .unwrap();
        config
            .apply_env(|key| (key == crate::config::ENV_DATABASE).then(|| "envdb".to_string()))
            .unwrap();

        let args = CliArgs::try_parse_from(["mongoframe", "-C", "c"]).unwrap();
        let cli = CliInterface::from_parts(args, config).unwrap();
        assert_eq!(cli.config().connection.database, "envdb");
        assert_eq!(cli.config().connection.uri, "mongodb://h:27017/filedb");
    }

    #[test]
    fn test_args_override_export_and_display() {
        let cli = interface(&[
            "mongoframe",
            "-C",
            "orders",
            "--batch-size",
            "250",
            "--sentinel",
            "na",
            "--sentinel",
            "N/A",
            "--format",
            "csv",
            "--no-progress",
        ])
        .unwrap();

        let config = cli.config();
        assert_eq!(config.export.batch_size, 250);
        assert_eq!(config.export.sentinels, vec!["na".to_string(), "N/A".to_string()]);
        assert_eq!(config.display.format, OutputFormat::Csv);
        assert!(!config.export.progress);
        assert_eq!(cli.args().collection.as_deref(), Some("orders"));
    }

    #[test]
    fn test_invalid_arguments_are_rejected() {
        let err = interface(&["mongoframe", "--format", "xml"]).err().unwrap();
        assert!(matches!(err, MongoframeError::Config(_)));

        let err = interface(&["mongoframe", "--batch-size", "0"]).err().unwrap();
        assert!(err.to_string().contains("export.batch_size"));
    }

    #[test]
    fn test_sanitized_config_hides_credentials() {
        let cli = interface(&["mongoframe", "mongodb://admin:hunter2@db:27017/app"]).unwrap();
        let shown = cli.sanitized_config_toml().unwrap();
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("mongodb://***@db:27017/app"));
    }
}
