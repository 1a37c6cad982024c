//! Data model shared by the query and export layers
//!
//! - [`Value`]: tagged cell value (integer, float, string, date, datetime,
//!   decimal, bytes, null)
//! - [`ResultSet`]: columns plus rows, one per query invocation
//! - [`ExportRecord`]: one row as an ordered key/value structure

mod result_set;
mod value;

pub use result_set::{ExportRecord, ResultSet};
pub use value::Value;
