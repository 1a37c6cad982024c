//! Error handling for roomstat.
//!
//! Every fallible operation in the crate returns [`Result`], whose error
//! side is [`RoomstatError`]. The more specific kinds live in [`kinds`]:
//! - `ExportError` for destination I/O failures and values a format cannot encode
//! - `ImportError` for unreadable or malformed dataset files
//! - `QueryError` for result columns that have no [`crate::Value`] counterpart
//!
//! Driver failures are kept as the original `sqlx::Error` and are never
//! reinterpreted.

pub mod kinds;

// Re-export commonly used types
pub use kinds::{
    ConfigError, ConnectionError, ExportError, ImportError, QueryError, Result, RoomstatError,
};
