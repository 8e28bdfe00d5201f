//! Health domain module.
//!
//! Aggregates backend availability into the health and database status
//! reports served by the HTTP surface and the `db_status` tool.

mod service;

pub use service::{
    DatabasesReport, HealthDatabases, HealthReport, HealthService, HealthStatus, NetworkedState,
    NetworkedStatus, SqliteStatus,
};
