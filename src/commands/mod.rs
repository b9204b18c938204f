//! Command implementations for the CLI
//!
//! - start: Start the costing server
//! - config: Configuration display and validation

pub mod config;
pub mod start;
