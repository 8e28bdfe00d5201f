//! Tool definitions module.
//!
//! One file per tool, grouped by the backend that serves it.

pub mod common;
pub mod pg;
pub mod sqlite;
pub mod status;

pub use pg::{PgGetTool, PgQueryTool, PgSetTool};
pub use sqlite::{SqliteDeleteTool, SqliteGetTool, SqliteListTool, SqliteSetTool};
pub use status::DbStatusTool;
