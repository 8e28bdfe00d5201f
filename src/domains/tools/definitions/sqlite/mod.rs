//! Tools served by the embedded SQLite store.

pub mod delete;
pub mod get;
pub mod list;
pub mod set;

pub use delete::SqliteDeleteTool;
pub use get::SqliteGetTool;
pub use list::SqliteListTool;
pub use set::SqliteSetTool;
