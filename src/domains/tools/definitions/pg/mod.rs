//! Tools served by the networked PostgreSQL store.
//!
//! These resolve whether or not the backend is configured; when it is not,
//! every call fails with `BackendNotConfigured`.

pub mod get;
pub mod query;
pub mod set;

pub use get::PgGetTool;
pub use query::PgQueryTool;
pub use set::PgSetTool;
