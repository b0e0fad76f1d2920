//! SIDRF scheduling engine
//!
//! Dominant-resource fairness blended with cumulative service time. Each
//! scheduling step runs three phases:
//!
//! 1. **Preemption**: when the total waiting time of queued tasks exceeds
//!    `alpha` times the total runtime of running tasks, running tasks are
//!    evicted heaviest-user-first while their user's cumulative runtime is
//!    above `min(avg_finish_time / |waiting|, beta)`.
//! 2. **Admission**: while every resource has idle capacity, the waiting task
//!    of the user with the smallest dominant share is started if it fits.
//!    If it does not fit, admission stops for this step; smaller tasks
//!    further back are not considered.
//! 3. **Execution**: running tasks advance by `min(time left, lease_time)`.
//!    Completed tasks release their resources, and everything still waiting
//!    accrues the time the step took.

use sidrf_core::resources;
use sidrf_core::{PolicyCounters, PolicyKind, SimulationConfig, Task, UserId};
use std::collections::BTreeSet;
use tracing::{debug, info, trace};

use crate::ledger::UserLedger;
use crate::policy::SchedulingPolicy;

/// SIDRF scheduler state
pub struct SidrfScheduler {
    /// Total capacity per resource dimension
    capacity: Vec<f64>,
    /// Sum of the demands of all running tasks
    consumed: Vec<f64>,
    /// Tasks waiting for admission, in queue order
    waiting: Vec<Task>,
    running: Vec<Task>,
    /// Completed tasks, in completion order
    finished: Vec<Task>,
    ledger: UserLedger,
    /// Share weight of the resource component
    p: f64,
    alpha: f64,
    beta: f64,
    lease_time: f64,
    /// Mean runtime of finished tasks
    avg_finish_time: f64,
    elapsed_time: f64,
    counters: PolicyCounters,
}

impl SidrfScheduler {
    /// Create a scheduler over `capacity` with the parameters of `config`
    pub fn new(capacity: Vec<f64>, config: &SimulationConfig) -> Self {
        info!(
            resources = capacity.len(),
            p = config.p,
            alpha = config.alpha,
            beta = config.beta,
            lease_time = config.lease_time,
            "SIDRF scheduler initialized"
        );

        let num_resources = capacity.len();
        Self {
            consumed: vec![0.0; num_resources],
            capacity,
            waiting: Vec::new(),
            running: Vec::new(),
            finished: Vec::new(),
            ledger: UserLedger::new(num_resources),
            p: config.p,
            alpha: config.alpha,
            beta: config.beta,
            lease_time: config.lease_time,
            avg_finish_time: 0.0,
            elapsed_time: 0.0,
            counters: PolicyCounters::default(),
        }
    }

    pub fn capacity(&self) -> &[f64] {
        &self.capacity
    }

    /// Resources held by running tasks, per dimension
    pub fn consumed(&self) -> &[f64] {
        &self.consumed
    }

    pub fn waiting(&self) -> &[Task] {
        &self.waiting
    }

    pub fn running(&self) -> &[Task] {
        &self.running
    }

    pub fn ledger(&self) -> &UserLedger {
        &self.ledger
    }

    pub fn avg_finish_time(&self) -> f64 {
        self.avg_finish_time
    }

    /// Cumulative runtime above which a running task may be preempted.
    ///
    /// Infinite while nothing waits. Before any task has finished the average
    /// is 0, so any user with positive runtime is preemptible.
    pub fn preemption_threshold(&self) -> f64 {
        if self.waiting.is_empty() {
            return f64::INFINITY;
        }
        (self.avg_finish_time / self.waiting.len() as f64).min(self.beta)
    }

    fn preemption_triggered(&self) -> bool {
        let waited: f64 = self.waiting.iter().map(Task::waiting_time).sum();
        let ran: f64 = self.running.iter().map(Task::runtime).sum();
        waited > self.alpha * ran
    }

    fn maybe_preempt(&mut self) {
        if !self.preemption_triggered() {
            return;
        }

        // Stable sort, so ties keep their running-queue order.
        let ledger = &self.ledger;
        self.running.sort_by(|a, b| {
            ledger
                .cumulative_runtime(b.user_id)
                .total_cmp(&ledger.cumulative_runtime(a.user_id))
        });

        while let Some(head) = self.running.first() {
            let usage = self.ledger.cumulative_runtime(head.user_id);
            let threshold = self.preemption_threshold();
            if usage <= threshold {
                break;
            }

            let task = self.running.remove(0);
            self.release(&task);
            self.counters.preemptions += 1;
            debug!(
                user_id = task.user_id,
                task_id = task.task_id,
                runtime = task.runtime(),
                usage = usage,
                threshold = threshold,
                "Preempted task"
            );
            self.waiting.push(task);
        }
    }

    /// Index of the first waiting task whose user has the strictly smallest share
    fn min_share_index(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, task) in self.waiting.iter().enumerate() {
            let share = self.ledger.share(task.user_id);
            if best.map_or(true, |(_, min)| share < min) {
                best = Some((idx, share));
            }
        }
        best.map(|(idx, _)| idx)
    }

    fn admit(&mut self) {
        while resources::has_headroom(&self.consumed, &self.capacity) {
            let Some(idx) = self.min_share_index() else {
                break;
            };
            if !resources::fits(&self.waiting[idx].demand, &self.consumed, &self.capacity) {
                break;
            }

            let task = self.waiting.remove(idx);
            resources::add_assign(&mut self.consumed, &task.demand);
            resources::add_assign(&mut self.ledger.account_mut(task.user_id).allocated, &task.demand);
            let share = self.ledger.recompute_share(task.user_id, &self.capacity, self.p);
            self.counters.admissions += 1;

            debug!(
                user_id = task.user_id,
                task_id = task.task_id,
                share = share,
                "Admitted task"
            );
            self.running.push(task);
        }
    }

    /// Return the resources of a task that has already left the running queue
    fn release(&mut self, task: &Task) {
        resources::sub_assign(&mut self.consumed, &task.demand);
        if self.running.is_empty() {
            self.consumed.iter_mut().for_each(|c| *c = 0.0);
        }

        let user_still_running = self.running.iter().any(|t| t.user_id == task.user_id);
        let account = self.ledger.account_mut(task.user_id);
        resources::sub_assign(&mut account.allocated, &task.demand);
        if !user_still_running {
            account.allocated.iter_mut().for_each(|a| *a = 0.0);
        }

        self.ledger.recompute_share(task.user_id, &self.capacity, self.p);
    }

    fn record_finish(&mut self, task: Task) {
        let count = self.finished.len() as f64;
        self.avg_finish_time = (self.avg_finish_time * count + task.runtime()) / (count + 1.0);
        self.counters.completions += 1;

        debug!(
            user_id = task.user_id,
            task_id = task.task_id,
            completion_time = task.completion_time(),
            waiting_time = task.waiting_time(),
            "Task finished"
        );
        self.finished.push(task);
    }

    /// Run every running task for `quantum` and retire the completed ones.
    ///
    /// Returns how long the step took: the largest amount of service any
    /// running task actually used.
    fn run_quantum(&mut self, quantum: f64) -> f64 {
        let mut step: f64 = 0.0;
        let mut served: BTreeSet<UserId> = BTreeSet::new();
        let mut still_running = Vec::with_capacity(self.running.len());
        let mut completed = Vec::new();

        for mut task in std::mem::take(&mut self.running) {
            let leftover = task.residual_time(quantum);
            let used = quantum - leftover;
            step = step.max(used);

            let account = self.ledger.account_mut(task.user_id);
            account.cumulative_runtime = account.cumulative_runtime.max(task.runtime());
            served.insert(task.user_id);

            if task.is_completed() {
                completed.push(task);
            } else {
                still_running.push(task);
            }
        }
        self.running = still_running;

        for task in completed {
            self.release(&task);
            self.record_finish(task);
        }
        for user in served {
            self.ledger.recompute_share(user, &self.capacity, self.p);
        }

        step
    }
}

impl SchedulingPolicy for SidrfScheduler {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Sidrf
    }

    fn enqueue(&mut self, task: Task) {
        trace!(user_id = task.user_id, task_id = task.task_id, "Enqueued task");
        self.waiting.push(task);
    }

    fn advance(&mut self, time: f64) {
        self.elapsed_time += time;

        let mut remaining = time;
        while remaining > 0.0 {
            if self.is_idle() {
                break;
            }

            self.maybe_preempt();
            self.admit();

            let quantum = remaining.min(self.lease_time);
            // Nothing admissible is running: the step is idle but time still passes.
            let step = if self.running.is_empty() {
                quantum
            } else {
                self.run_quantum(quantum)
            };

            for task in &mut self.waiting {
                task.wait(step);
            }
            remaining -= step;

            trace!(
                quantum = quantum,
                step = step,
                waiting = self.waiting.len(),
                running = self.running.len(),
                "Scheduling step"
            );
        }
    }

    fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    fn pending_work(&self) -> f64 {
        self.waiting
            .iter()
            .chain(&self.running)
            .map(Task::remaining_time)
            .sum()
    }

    fn is_idle(&self) -> bool {
        self.waiting.is_empty() && self.running.is_empty()
    }

    fn finished(&self) -> &[Task] {
        &self.finished
    }

    fn into_finished(self: Box<Self>) -> Vec<Task> {
        self.finished
    }

    fn counters(&self) -> PolicyCounters {
        self.counters
    }
}
