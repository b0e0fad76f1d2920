//! Scheduling policy abstraction

use sidrf_core::{PolicyCounters, PolicyKind, SidrfResult, SimulationConfig, Task};

use crate::sidrf::SidrfScheduler;

/// A scheduling policy driven by the simulator.
///
/// Implementations own their queues and accounting; the simulator only feeds
/// tasks in and advances simulated time.
pub trait SchedulingPolicy {
    /// Which policy this is
    fn kind(&self) -> PolicyKind;

    /// Add a task to the waiting queue without allocating anything
    fn enqueue(&mut self, task: Task);

    /// Advance simulated time by `time` units
    fn advance(&mut self, time: f64);

    /// Simulated time advanced so far
    fn elapsed_time(&self) -> f64;

    /// Remaining CPU time over all waiting and running tasks
    fn pending_work(&self) -> f64;

    /// Whether no task is waiting or running
    fn is_idle(&self) -> bool;

    /// Tasks that have finished, in completion order
    fn finished(&self) -> &[Task];

    /// Consume the policy and return its finished tasks
    fn into_finished(self: Box<Self>) -> Vec<Task>;

    fn counters(&self) -> PolicyCounters;
}

/// Build the policy selected by `config` over the given capacities
pub fn build_policy(
    config: &SimulationConfig,
    capacity: Vec<f64>,
) -> SidrfResult<Box<dyn SchedulingPolicy>> {
    config.validate()?;
    match config.policy {
        PolicyKind::Sidrf => Ok(Box::new(SidrfScheduler::new(capacity, config))),
    }
}
