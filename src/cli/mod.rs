//! Command-line interface for roomstat
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and merging with arguments
//! - Subcommands (version, completion, config)

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::{Config, LogLevel};
use crate::error::{ConfigError, Result};
use crate::executor::BatchInputs;
use crate::export::ExportFormat;

mod completion;

/// Load room and student datasets into MySQL and export room statistics
#[derive(Parser, Debug)]
#[command(
    name = "roomstat",
    version,
    about = "Room and student statistics exporter",
    long_about = "Imports rooms and students from JSON files into MySQL, runs four
room statistics queries and writes each result as JSON or XML.",
    subcommand_negates_reqs = true
)]
pub struct CliArgs {
    /// Path to JSON file with students data
    #[arg(long, value_name = "FILE", required = true)]
    pub students: Option<PathBuf>,

    /// Path to JSON file with rooms data
    #[arg(long, value_name = "FILE", required = true)]
    pub rooms: Option<PathBuf>,

    /// Output format (falls back to `export.format` from the config file)
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub format: Option<ExportFormat>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Directory receiving the exported files
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Server to connect to
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to connect to
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Database name to use
    #[arg(long, value_name = "NAME")]
    pub database: Option<String>,

    /// Username for authentication
    #[arg(short = 'u', long, value_name = "USERNAME")]
    pub user: Option<String>,

    /// Password for authentication
    #[arg(short = 'p', long, value_name = "PASSWORD")]
    pub password: Option<String>,

    /// Quiet mode (errors only, no summary)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,

    /// Disable import progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for roomstat
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version,

    /// Generate shell completion script
    Completion {
        /// Shell type
        #[arg(value_enum, value_name = "SHELL")]
        shell: Shell,
    },

    /// Show configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Configuration with arguments applied
    config: Config,
}

impl CliInterface {
    /// Parse process arguments and load configuration
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Build from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and environment, then apply arguments
    ///
    /// Validation is left to the caller so `config --validate` can report
    /// problems instead of failing here.
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;
        Self::apply_args_to_config(&mut config, args);
        Ok(config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Apply CLI arguments to configuration
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_logging_args(config, args);
        Self::apply_connection_args(config, args);
        Self::apply_export_args(config, args);
    }

    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    fn apply_connection_args(config: &mut Config, args: &CliArgs) {
        if let Some(host) = &args.host {
            config.connection.host = host.clone();
        }
        if let Some(port) = args.port {
            config.connection.port = port;
        }
        if let Some(database) = &args.database {
            config.connection.database = database.clone();
        }
        if let Some(user) = &args.user {
            config.connection.user = user.clone();
        }
        if let Some(password) = &args.password {
            config.connection.password = password.clone();
        }
    }

    fn apply_export_args(config: &mut Config, args: &CliArgs) {
        if let Some(format) = args.format {
            config.export.format = Some(format);
        }
        if let Some(dir) = &args.output_dir {
            config.export.output_dir = dir.clone();
        }
        if args.no_progress || args.quiet {
            config.export.progress = false;
        }
    }

    /// Inputs for a batch run
    ///
    /// # Returns
    /// * `Result<BatchInputs>` - Inputs, or an error naming the missing one
    pub fn batch_inputs(&self) -> Result<BatchInputs> {
        let missing = |name: &str| ConfigError::MissingField(name.to_string());

        Ok(BatchInputs {
            rooms: self.args.rooms.clone().ok_or_else(|| missing("--rooms"))?,
            students: self.args.students.clone().ok_or_else(|| missing("--students"))?,
            format: self.config.export.format.ok_or_else(|| missing("--format"))?,
        })
    }

    /// Handle subcommands
    ///
    /// # Returns
    /// * `Result<bool>` - True if a subcommand was handled, false to continue
    pub fn handle_subcommand(&self) -> Result<bool> {
        match &self.args.command {
            Some(Commands::Version) => {
                self.show_version();
                Ok(true)
            }
            Some(Commands::Completion { shell }) => {
                completion::generate_completion(*shell, &mut std::io::stdout());
                Ok(true)
            }
            Some(Commands::Config { show, validate }) => {
                self.handle_config_command(*show, *validate)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn show_version(&self) {
        println!("roomstat version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    /// Handle config subcommand
    ///
    /// Without flags the effective configuration is shown.
    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            self.validate_config_file();
        }

        if show || !validate {
            self.show_config()?;
        }

        Ok(())
    }

    /// Validate the configuration file and the effective configuration
    fn validate_config_file(&self) {
        let path = self.get_config_path();
        println!("Validating configuration file: {}", path.display());

        if !path.exists() {
            println!("Configuration file does not exist, defaults apply");
        }

        match self.config.validate() {
            Ok(()) => println!("Configuration is valid"),
            Err(e) => println!("Configuration validation failed: {}", e),
        }
    }

    /// Show effective configuration
    fn show_config(&self) -> Result<()> {
        let path = self.get_config_path();
        println!("Configuration file: {}", path.display());
        println!();
        println!("=== Effective Configuration ===");
        println!();
        println!("{}", self.config.to_toml_with_comments()?);
        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_config_path)
    }

    /// Print the target server unless quiet
    pub fn print_banner(&self) {
        if !self.args.quiet {
            println!("Connecting to: {}", self.config.connection.sanitized_uri());
            println!("Using roomstat: {}", env!("CARGO_PKG_VERSION"));
        }
    }
}
