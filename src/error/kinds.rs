use std::panic::Location;
use std::{fmt, io};

use crate::error::mongo::format_mongodb_error;

/// Crate-wide `Result` type using [`MongoframeError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, MongoframeError>;

/// Top-level error type for mongoframe operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum MongoframeError {
    /// Connection-related errors.
    Connection(ConnectionError),

    /// Errors raised while building a table from documents.
    Frame(FrameError),

    /// A failed collection export, wrapping its original cause.
    Export(ExportError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// MongoDB driver errors.
    MongoDb(mongodb::error::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Connection-specific errors.
#[derive(Debug)]
pub enum ConnectionError {
    /// Failed to establish a connection.
    ConnectionFailed(String),

    /// Connection timeout.
    Timeout,

    /// Invalid connection URI.
    InvalidUri(String),

    /// Not currently connected to MongoDB.
    NotConnected,

    /// Ping command failed.
    PingFailed(String),
}

/// Errors raised while converting documents into a table fragment.
#[derive(Debug)]
pub enum FrameError {
    /// A field holds a BSON type that has no tabular representation.
    UnsupportedType { field: String, type_name: String },

    /// A row does not have one cell per column.
    RowWidthMismatch { expected: usize, found: usize },
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Missing required field.
    MissingField(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/// Stage of an export at which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportErrorKind {
    /// The connection could not be established or reused.
    Connection,

    /// The batched read failed.
    Query,

    /// Accumulated documents could not be turned into a table fragment.
    Construction,
}

/// Domain error returned by a collection export.
///
/// Every failure inside an export is wrapped exactly once into this type,
/// which keeps the original cause reachable through
/// [`std::error::Error::source`].
#[derive(Debug)]
pub struct ExportError {
    kind: ExportErrorKind,
    target: String,
    location: &'static Location<'static>,
    cause: Box<MongoframeError>,
}

impl ExportError {
    /// Wrap `cause` as a failure of `kind` while exporting `target`.
    ///
    /// The source location recorded is that of the caller.
    #[track_caller]
    pub fn new(kind: ExportErrorKind, target: impl Into<String>, cause: MongoframeError) -> Self {
        Self {
            kind,
            target: target.into(),
            location: Location::caller(),
            cause: Box::new(cause),
        }
    }

    /// Failure stage.
    pub fn kind(&self) -> ExportErrorKind {
        self.kind
    }

    /// Namespace (`database.collection`) being exported.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Source location where the failure was wrapped.
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    /// The original error.
    pub fn cause(&self) -> &MongoframeError {
        &self.cause
    }
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for MongoframeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MongoframeError::Connection(e) => write!(f, "Connection error: {e}"),
            MongoframeError::Frame(e) => write!(f, "Table construction error: {e}"),
            MongoframeError::Export(e) => write!(f, "{e}"),
            MongoframeError::Config(e) => write!(f, "Configuration error: {e}"),
            MongoframeError::Io(e) => write!(f, "I/O error: {e}"),
            MongoframeError::MongoDb(e) => format_mongodb_error(f, e),
            MongoframeError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::ConnectionFailed(msg) => write!(f, "Failed to connect: {msg}"),
            ConnectionError::Timeout => write!(f, "Connection timeout"),
            ConnectionError::InvalidUri(uri) => write!(f, "Invalid connection URI: {uri}"),
            ConnectionError::NotConnected => write!(f, "Not connected to MongoDB"),
            ConnectionError::PingFailed(msg) => write!(f, "Ping failed: {msg}"),
        }
    }
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::UnsupportedType { field, type_name } => {
                write!(f, "Field '{field}' has unsupported type {type_name}")
            }
            FrameError::RowWidthMismatch { expected, found } => {
                write!(f, "Row has {found} cells, expected {expected}")
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::MissingField(field) => write!(f, "Missing required field: {field}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl fmt::Display for ExportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportErrorKind::Connection => write!(f, "connection"),
            ExportErrorKind::Query => write!(f, "query"),
            ExportErrorKind::Construction => write!(f, "construction"),
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Export of '{}' failed ({} error at {}:{}): {}",
            self.target,
            self.kind,
            self.location.file(),
            self.location.line(),
            self.cause
        )
    }
}

impl std::error::Error for MongoframeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MongoframeError::Connection(e) => Some(e),
            MongoframeError::Frame(e) => Some(e),
            MongoframeError::Export(e) => Some(e),
            MongoframeError::Config(e) => Some(e),
            MongoframeError::Io(e) => Some(e),
            MongoframeError::MongoDb(e) => Some(e),
            MongoframeError::Generic(_) => None,
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.cause.as_ref())
    }
}

impl std::error::Error for ConnectionError {}
impl std::error::Error for FrameError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to MongoframeError ========================= */

impl From<io::Error> for MongoframeError {
    fn from(err: io::Error) -> Self {
        MongoframeError::Io(err)
    }
}

impl From<mongodb::error::Error> for MongoframeError {
    fn from(err: mongodb::error::Error) -> Self {
        MongoframeError::MongoDb(err)
    }
}

impl From<ConnectionError> for MongoframeError {
    fn from(err: ConnectionError) -> Self {
        MongoframeError::Connection(err)
    }
}

impl From<FrameError> for MongoframeError {
    fn from(err: FrameError) -> Self {
        MongoframeError::Frame(err)
    }
}

impl From<ExportError> for MongoframeError {
    fn from(err: ExportError) -> Self {
        MongoframeError::Export(err)
    }
}

impl From<ConfigError> for MongoframeError {
    fn from(err: ConfigError) -> Self {
        MongoframeError::Config(err)
    }
}

impl From<String> for MongoframeError {
    fn from(msg: String) -> Self {
        MongoframeError::Generic(msg)
    }
}

impl From<&str> for MongoframeError {
    fn from(msg: &str) -> Self {
        MongoframeError::Generic(msg.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_export_error_keeps_cause() {
        let err = ExportError::new(
            ExportErrorKind::Query,
            "shop.orders",
            ConnectionError::PingFailed("reset by peer".into()).into(),
        );

        assert_eq!(err.kind(), ExportErrorKind::Query);
        assert_eq!(err.target(), "shop.orders");
        assert!(matches!(
            err.cause(),
            MongoframeError::Connection(ConnectionError::PingFailed(_))
        ));

        let source = err.source().expect("cause is exposed as source");
        assert!(source.to_string().contains("reset by peer"));
    }

    #[test]
    fn test_export_error_records_caller_location() {
        let err = ExportError::new(
            ExportErrorKind::Construction,
            "db.c",
            MongoframeError::Generic("boom".into()),
        );
        assert!(err.location().file().ends_with("kinds.rs"));

        let text = err.to_string();
        assert!(text.contains("db.c"));
        assert!(text.contains("construction error"));
        assert!(text.contains("boom"));
    }

    #[test]
    fn test_frame_error_display() {
        let err = FrameError::UnsupportedType {
            field: "code".into(),
            type_name: "JavaScriptCode".into(),
        };
        assert_eq!(
            err.to_string(),
            "Field 'code' has unsupported type JavaScriptCode"
        );
    }
}
