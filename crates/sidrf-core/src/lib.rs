//! sidrf-core: Core types for the sidrf scheduling simulator
//!
//! This crate provides the types shared by the engine and the CLI:
//! - Tasks and resource vector arithmetic
//! - Workload input parsing
//! - Simulation configuration
//! - Result reports
//! - Error handling

pub mod config;
pub mod error;
pub mod report;
pub mod resources;
pub mod task;
pub mod workload;

pub use config::*;
pub use error::*;
pub use report::*;
pub use task::*;
pub use workload::*;
