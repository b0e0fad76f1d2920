//! Task type definition

use serde::Serialize;

/// Identifier of the user that submitted a task
pub type UserId = u32;

/// Identifier of a task within the workload
pub type TaskId = u32;

/// Remaining work at or below this fraction of the burst counts as done.
/// Summing many fractional quanta can otherwise leave a task an ulp short.
const COMPLETION_TOLERANCE: f64 = 1e-9;

/// A unit of work with a resource demand vector and a CPU burst.
///
/// Only [`Task::residual_time`] and [`Task::wait`] mutate a task once it has
/// been parsed; everything else is derived from the accumulators.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    /// Submitting user
    pub user_id: UserId,
    /// Task identifier
    pub task_id: TaskId,
    /// Simulated time the task enters the system
    pub arrival_time: f64,
    /// Total CPU time required
    pub burst_time: f64,
    /// Quantity requested per resource dimension
    pub demand: Vec<f64>,
    /// CPU time consumed so far
    runtime: f64,
    /// Time spent in the waiting queue so far
    waiting_time: f64,
}

impl Task {
    /// Create a task that has neither run nor waited yet
    pub fn new(
        user_id: UserId,
        task_id: TaskId,
        arrival_time: f64,
        burst_time: f64,
        demand: Vec<f64>,
    ) -> Self {
        Self {
            user_id,
            task_id,
            arrival_time,
            burst_time,
            demand,
            runtime: 0.0,
            waiting_time: 0.0,
        }
    }

    /// CPU time consumed so far
    pub fn runtime(&self) -> f64 {
        self.runtime
    }

    /// Accumulated waiting time
    pub fn waiting_time(&self) -> f64 {
        self.waiting_time
    }

    pub fn remaining_time(&self) -> f64 {
        self.burst_time - self.runtime
    }

    pub fn is_completed(&self) -> bool {
        self.runtime >= self.burst_time
    }

    pub fn turnaround_time(&self) -> f64 {
        self.runtime + self.waiting_time
    }

    /// Arrival plus turnaround; only meaningful once the task has finished
    pub fn completion_time(&self) -> f64 {
        self.arrival_time + self.turnaround_time()
    }

    /// Run the task for up to `time` units.
    ///
    /// Returns the unused part of `time`: zero while the task still has work
    /// left, otherwise whatever remained after the task completed. A task
    /// that would be left with less than the completion tolerance finishes
    /// in this call.
    pub fn residual_time(&mut self, time: f64) -> f64 {
        let remaining = self.remaining_time();
        if time + self.tolerance() < remaining {
            self.runtime += time;
            0.0
        } else {
            self.runtime = self.burst_time;
            (time - remaining).max(0.0)
        }
    }

    fn tolerance(&self) -> f64 {
        COMPLETION_TOLERANCE * self.burst_time.max(1.0)
    }

    /// Accrue `time` units of waiting
    pub fn wait(&mut self, time: f64) {
        self.waiting_time += time;
    }
}
