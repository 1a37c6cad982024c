use std::path::PathBuf;
use std::{fmt, io};

/// Crate-wide `Result` type using [`RoomstatError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, RoomstatError>;

/// Top-level error type for roomstat operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum RoomstatError {
    /// Connection-related errors.
    Connection(ConnectionError),

    /// Configuration errors.
    Config(ConfigError),

    /// Dataset import errors.
    Import(ImportError),

    /// Result decoding errors raised while materializing a query.
    Query(QueryError),

    /// Export errors (I/O and encoding).
    Export(ExportError),

    /// Database driver errors, propagated unchanged from the engine.
    Database(sqlx::Error),

    /// I/O errors.
    Io(io::Error),
}

/// Connection-specific errors.
#[derive(Debug)]
pub enum ConnectionError {
    /// Failed to establish a connection.
    ConnectionFailed(String),

    /// Not currently connected to the database.
    NotConnected,

    /// The session's transaction was already committed or rolled back.
    SessionClosed,
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Missing required field.
    MissingField(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/// Dataset import errors.
#[derive(Debug)]
pub enum ImportError {
    /// Dataset file could not be read.
    Read { path: PathBuf, source: io::Error },

    /// Dataset file is not a valid JSON array of the expected records.
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Errors raised while turning engine rows into a [`crate::ResultSet`].
#[derive(Debug)]
pub enum QueryError {
    /// Column type with no [`crate::Value`] counterpart.
    UnsupportedColumnType { column: String, type_name: String },
}

/// Export-specific errors.
#[derive(Debug)]
pub enum ExportError {
    /// Destination could not be opened or written.
    Io { path: PathBuf, source: io::Error },

    /// A value cannot be represented in the chosen format.
    Encoding {
        format: &'static str,
        type_name: String,
        reason: String,
    },

    /// Destination path is unusable before any write is attempted.
    InvalidPath(String),
}

impl ExportError {
    /// Build an I/O error naming the destination path
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }

    /// Build an encoding error naming the offending value's type
    pub fn encoding(
        format: &'static str,
        type_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ExportError::Encoding {
            format,
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for RoomstatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomstatError::Connection(e) => write!(f, "Connection error: {e}"),
            RoomstatError::Config(e) => write!(f, "Configuration error: {e}"),
            RoomstatError::Import(e) => write!(f, "Import error: {e}"),
            RoomstatError::Query(e) => write!(f, "Query error: {e}"),
            RoomstatError::Export(e) => write!(f, "Export error: {e}"),
            RoomstatError::Database(e) => write!(f, "Database error: {e}"),
            RoomstatError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::ConnectionFailed(msg) => write!(f, "Failed to connect: {msg}"),
            ConnectionError::NotConnected => write!(f, "Not connected to the database"),
            ConnectionError::SessionClosed => write!(f, "Session is already closed"),
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

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::Read { path, source } => {
                write!(f, "Failed to read {}: {source}", path.display())
            }
            ImportError::Parse { path, source } => {
                write!(f, "Failed to parse {}: {source}", path.display())
            }
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::UnsupportedColumnType { column, type_name } => {
                write!(f, "Unsupported type '{type_name}' for column '{column}'")
            }
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Io { path, source } => {
                write!(f, "Failed to write {}: {source}", path.display())
            }
            ExportError::Encoding {
                format,
                type_name,
                reason,
            } => write!(f, "Cannot encode {type_name} value as {format}: {reason}"),
            ExportError::InvalidPath(msg) => write!(f, "Invalid destination: {msg}"),
        }
    }
}

impl std::error::Error for RoomstatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RoomstatError::Database(e) => Some(e),
            RoomstatError::Io(e) => Some(e),
            RoomstatError::Export(ExportError::Io { source, .. }) => Some(source),
            _ => None,
        }
    }
}
impl std::error::Error for ConnectionError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for ImportError {}
impl std::error::Error for QueryError {}
impl std::error::Error for ExportError {}

/* ========================= Conversions to RoomstatError ========================= */

impl From<io::Error> for RoomstatError {
    fn from(err: io::Error) -> Self {
        RoomstatError::Io(err)
    }
}

impl From<sqlx::Error> for RoomstatError {
    fn from(err: sqlx::Error) -> Self {
        RoomstatError::Database(err)
    }
}

impl From<ConnectionError> for RoomstatError {
    fn from(err: ConnectionError) -> Self {
        RoomstatError::Connection(err)
    }
}

impl From<ConfigError> for RoomstatError {
    fn from(err: ConfigError) -> Self {
        RoomstatError::Config(err)
    }
}

impl From<ImportError> for RoomstatError {
    fn from(err: ImportError) -> Self {
        RoomstatError::Import(err)
    }
}

impl From<QueryError> for RoomstatError {
    fn from(err: QueryError) -> Self {
        RoomstatError::Query(err)
    }
}

impl From<ExportError> for RoomstatError {
    fn from(err: ExportError) -> Self {
        RoomstatError::Export(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_io_error_names_path() {
        let err: RoomstatError = ExportError::io(
            "/tmp/out/student_count.json",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        )
        .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Export error: "));
        assert!(msg.contains("/tmp/out/student_count.json"));
    }

    #[test]
    fn test_encoding_error_names_type() {
        let err = ExportError::encoding("json", "bytes", "no JSON representation");
        assert_eq!(
            err.to_string(),
            "Cannot encode bytes value as json: no JSON representation"
        );
    }

    #[test]
    fn test_config_invalid_value_display() {
        let err = ConfigError::InvalidValue {
            field: "import.batch_size".to_string(),
            value: "0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid value '0' for field 'import.batch_size'"
        );
    }
}
