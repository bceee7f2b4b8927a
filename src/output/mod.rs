//! Output formatting for CLI results

pub mod json;
pub mod table;

pub use json::format_json;
pub use table::{fit_marker, format_table};
