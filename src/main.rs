//! roomstat - room and student statistics exporter
//!
//! # Usage
//!
//! ```bash
//! roomstat --students students.json --rooms rooms.json --format xml
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;

use roomstat::cli::CliInterface;
use roomstat::executor::BatchExecutor;
use roomstat::Result;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Handle subcommands or run the batch
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    cli.config().validate()?;
    let inputs = cli.batch_inputs()?;

    cli.print_banner();

    BatchExecutor::new(cli.config().clone())
        .quiet(cli.args().quiet)
        .run(&inputs)
        .await?;

    Ok(())
}

/// Initialize logging on stderr
///
/// `RUST_LOG` takes precedence over the configured level.
fn initialize_logging(cli: &CliInterface) {
    let level: Level = cli.config().logging.level.to_tracing_level();
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
