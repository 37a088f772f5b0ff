//! mongoframe library
//!
//! Exports MongoDB collections into in-memory tables. A collection is read
//! through a batched cursor, each batch becomes a table fragment, and the
//! fragments are concatenated in cursor order. The `_id` column is dropped
//! and `"na"` values become missing cells.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `connection`: MongoDB connection management
//! - `error`: Error types and handling
//! - `exporter`: The collection exporter
//! - `formatter`: Rendering tables as text
//! - `frame`: Value model and tables
//!
//! # Example
//!
//! ```no_run
//! use mongoframe::{CollectionExporter, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut config = Config::default();
//!     config.connection.database = "proj1".to_string();
//!
//!     let exporter = CollectionExporter::connect(&config).await?;
//!     let table = exporter.export("vehicles", None).await?;
//!     println!("{} rows, columns: {:?}", table.num_rows(), table.columns());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod connection;
pub mod error;
pub mod exporter;
pub mod formatter;
pub mod frame;

// Re-export commonly used types
pub use config::Config;
pub use connection::ConnectionManager;
pub use error::{ExportError, ExportErrorKind, MongoframeError, Result};
pub use exporter::{CollectionExporter, DocumentCursor, DocumentSource, ExportStats};
pub use formatter::Formatter;
pub use frame::{Cell, Table, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}
