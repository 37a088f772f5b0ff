//! Error handling for mongoframe.
//!
//! This module provides:
//! - A crate-wide error enum with specific kinds (connection, frame, config)
//! - [`ExportError`], the single domain error an export returns, carrying the
//!   failure stage, target namespace, source location and original cause
//! - Structured error information extracted from MongoDB driver errors
//!
//! # Example
//!
//! ```rust,no_run
//! use mongoframe::error::{ExportErrorKind, MongoframeError};
//!
//! fn report(err: &MongoframeError) {
//!     if let MongoframeError::Export(e) = err {
//!         if e.kind() == ExportErrorKind::Query {
//!             eprintln!("read of {} failed: {}", e.target(), e.cause());
//!         }
//!     }
//! }
//! ```

pub mod kinds;
pub mod mongo;

// Re-export commonly used types
pub use kinds::{
    ConfigError, ConnectionError, ExportError, ExportErrorKind, FrameError, MongoframeError,
    Result,
};
pub use mongo::ErrorInfo;
