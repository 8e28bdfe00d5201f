//! Domains module containing business logic organized by bounded contexts.
//!
//! - **storage**: the embedded and networked record stores
//! - **tools**: tool descriptors, registry and dispatcher
//! - **health**: composite backend status

pub mod health;
pub mod storage;
pub mod tools;
