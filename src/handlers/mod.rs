//! HTTP handlers
//!
//! - save: price a submission and persist it
//! - submissions: list persisted submissions, newest first
//! - health: liveness check

pub mod health;
pub mod save;
pub mod submissions;
