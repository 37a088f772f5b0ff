//! mongoframe - export a MongoDB collection as a table
//!
//! # Usage
//!
//! ```bash
//! mongoframe mongodb://localhost:27017/shop -C orders
//! mongoframe -C orders --format csv -o orders.csv
//! mongoframe config --show
//! ```

use tracing::Level;

use mongoframe::cli::CliInterface;
use mongoframe::error::Result;

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
/// 3. Handle subcommands or run the export
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    if cli.handle_subcommand()? {
        return Ok(());
    }

    cli.run_export().await
}

/// Initialize logging system based on verbosity level
///
/// Logs go to stderr so that CSV or JSON Lines on stdout stay clean.
fn initialize_logging(cli: &CliInterface) {
    let level = if cli.args().very_verbose {
        Level::TRACE
    } else if cli.args().verbose {
        Level::DEBUG
    } else if cli.args().quiet {
        Level::ERROR
    } else {
        cli.config().logging.level.to_tracing_level()
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
