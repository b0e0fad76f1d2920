//! sidrf-scheduler: Fair-share scheduling engine for sidrf
//!
//! This crate provides the scheduling logic behind a simulation run:
//! - Per-user allocation and service accounting
//! - The SIDRF admission and preemption policy
//! - The driver that feeds tasks in arrival order and drains the engine

pub mod ledger;
pub mod policy;
pub mod sidrf;
pub mod simulator;

pub use ledger::{UserAccount, UserLedger};
pub use policy::{build_policy, SchedulingPolicy};
pub use sidrf::SidrfScheduler;
pub use simulator::{SimulationOutcome, Simulator};
