//! Simulation driver

use sidrf_core::{PolicyCounters, PolicyKind, SidrfError, SidrfResult, Task};
use tracing::{info, warn};

use crate::policy::SchedulingPolicy;

/// Drain passes before leftover work is reported as an error. One pass
/// normally suffices; later ones absorb rounding in the step clock.
const MAX_DRAIN_ROUNDS: usize = 8;

/// Result of a completed simulation
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    pub policy: PolicyKind,
    /// Finished tasks, in completion order
    pub finished: Vec<Task>,
    pub counters: PolicyCounters,
    /// Simulated clock at the end of the run
    pub elapsed_time: f64,
}

/// Feeds tasks into a policy in arrival order and drains it
#[derive(Debug, Default)]
pub struct Simulator;

impl Simulator {
    pub fn new() -> Self {
        Self
    }

    /// Run `tasks` through `policy`.
    ///
    /// Tasks must already be in non-decreasing arrival order; they are not
    /// sorted here. Before each arrival the clock is advanced up to the
    /// arrival time, then everything left is drained by advancing the total
    /// remaining work, repeated while rounding leaves anything unfinished.
    pub fn run(
        &self,
        mut policy: Box<dyn SchedulingPolicy>,
        tasks: Vec<Task>,
    ) -> SidrfResult<SimulationOutcome> {
        let task_count = tasks.len();
        info!(
            policy = %policy.kind(),
            tasks = task_count,
            "Starting simulation"
        );

        let mut last_arrival = f64::NEG_INFINITY;
        for task in tasks {
            if task.arrival_time < last_arrival {
                warn!(
                    user_id = task.user_id,
                    task_id = task.task_id,
                    arrival_time = task.arrival_time,
                    previous_arrival = last_arrival,
                    "Task arrives earlier than its predecessor; it is enqueued late"
                );
            }
            last_arrival = last_arrival.max(task.arrival_time);

            let gap = (task.arrival_time - policy.elapsed_time()).max(0.0);
            policy.advance(gap);
            policy.enqueue(task);
        }

        let mut drained = 0.0;
        for _ in 0..MAX_DRAIN_ROUNDS {
            if policy.is_idle() {
                break;
            }
            // Zero-length tasks still need one step to be admitted and retired.
            let pending = policy.pending_work().max(f64::MIN_POSITIVE);
            policy.advance(pending);
            drained += pending;
        }

        if !policy.is_idle() {
            return Err(SidrfError::Scheduler(format!(
                "{} of {} tasks did not finish after draining {} units of work",
                task_count - policy.finished().len(),
                task_count,
                drained
            )));
        }

        let kind = policy.kind();
        let counters = policy.counters();
        let elapsed_time = policy.elapsed_time();
        let finished = policy.into_finished();

        info!(
            policy = %kind,
            finished = finished.len(),
            admissions = counters.admissions,
            preemptions = counters.preemptions,
            elapsed_time = elapsed_time,
            "Simulation complete"
        );

        Ok(SimulationOutcome {
            policy: kind,
            finished,
            counters,
            elapsed_time,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::build_policy;
    use sidrf_core::{SimulationConfig, Workload};

    const EPS: f64 = 1e-9;

    fn config(p: f64, alpha: f64, beta: f64, lease_time: f64) -> SimulationConfig {
        SimulationConfig {
            policy: PolicyKind::Sidrf,
            p,
            alpha,
            beta,
            lease_time,
        }
    }

    fn simulate(input: &str, config: &SimulationConfig) -> SimulationOutcome {
        let workload = Workload::parse(input).unwrap();
        let policy = build_policy(config, workload.capacity).unwrap();
        Simulator::new().run(policy, workload.tasks).unwrap()
    }

    fn find(outcome: &SimulationOutcome, user: u32, id: u32) -> &Task {
        outcome
            .finished
            .iter()
            .find(|t| t.user_id == user && t.task_id == id)
            .unwrap()
    }

    #[test]
    fn test_single_task() {
        let outcome = simulate("10\n1 1 0 5 5\n", &config(0.5, 1.0, 100.0, 1.0));
        let t = find(&outcome, 1, 1);
        assert_eq!(t.completion_time(), 5.0);
        assert_eq!(t.waiting_time(), 0.0);
        assert_eq!(t.turnaround_time(), 5.0);
        assert_eq!(outcome.counters.completions, 1);
    }

    #[test]
    fn test_conflicting_tasks_wait_for_each_other() {
        let outcome = simulate(
            "10\n1 1 0 5 8\n1 2 0 5 8\n",
            &config(0.5, 10.0, 100.0, 1.0),
        );
        let first = find(&outcome, 1, 1);
        let second = find(&outcome, 1, 2);

        assert_eq!(first.completion_time(), 5.0);
        assert_eq!(second.waiting_time(), 5.0);
        assert_eq!(second.completion_time(), 10.0);
        assert!(first.waiting_time() + second.waiting_time() > 0.0);
    }

    #[test]
    fn test_user_with_history_yields_to_newcomer() {
        let outcome = simulate(
            "10\n1 1 0 3 6\n1 2 5 2 6\n2 3 5 2 6\n",
            &config(0.5, 1000.0, 100.0, 1.0),
        );

        let veteran = find(&outcome, 1, 2);
        let newcomer = find(&outcome, 2, 3);
        assert_eq!(newcomer.waiting_time(), 0.0);
        assert_eq!(newcomer.completion_time(), 7.0);
        assert_eq!(veteran.waiting_time(), 2.0);
        assert_eq!(veteran.completion_time(), 9.0);
        assert_eq!(outcome.finished.last().unwrap().task_id, 2);
    }

    #[test]
    fn test_starvation_triggers_preemption() {
        let outcome = simulate(
            "10\n1 1 0 10 10\n2 1 1 2 5\n",
            &config(0.5, 0.5, 100.0, 1.0),
        );

        assert!(outcome.counters.preemptions >= 1);
        for t in &outcome.finished {
            assert_eq!(t.runtime(), t.burst_time);
        }
        // The short task finishes long before the long one would have.
        assert!(find(&outcome, 2, 1).completion_time() < 11.0);
    }

    #[test]
    fn test_completion_identity() {
        let outcome = simulate(
            "8 6\n1 1 0 4 4 2\n2 1 0 3 6 1\n1 2 1 2 2 5\n3 1 2.5 6 1 1\n2 2 4 1 8 6\n",
            &config(0.4, 0.7, 5.0, 0.5),
        );

        assert_eq!(outcome.finished.len(), 5);
        for t in &outcome.finished {
            assert_eq!(t.runtime(), t.burst_time);
            let expected = t.arrival_time + t.waiting_time() + t.runtime();
            assert!((t.completion_time() - expected).abs() < EPS);
            assert!(t.waiting_time() >= 0.0);
        }
    }

    #[test]
    fn test_overdraining_is_harmless() {
        let input = "10 10\n1 1 0 3 6 2\n2 1 0 4 5 5\n3 1 1 2 4 8\n";
        let config = config(0.5, 1.0, 10.0, 1.0);

        let drained = simulate(input, &config);

        let workload = Workload::parse(input).unwrap();
        let mut policy = build_policy(&config, workload.capacity).unwrap();
        for task in workload.tasks {
            let gap = (task.arrival_time - policy.elapsed_time()).max(0.0);
            policy.advance(gap);
            policy.enqueue(task);
        }
        policy.advance(1_000.0);
        assert!(policy.is_idle());

        let over = policy.into_finished();
        assert_eq!(over.len(), drained.finished.len());
        for t in &over {
            let d = find(&drained, t.user_id, t.task_id);
            assert_eq!(t.completion_time(), d.completion_time());
            assert_eq!(t.waiting_time(), d.waiting_time());
        }
    }

    #[test]
    fn test_late_arrival_gap_is_idle_time() {
        let outcome = simulate("10\n1 1 0 1 5\n1 2 10 1 5\n", &config(0.5, 1.0, 100.0, 1.0));
        let late = find(&outcome, 1, 2);
        assert_eq!(late.waiting_time(), 0.0);
        assert_eq!(late.completion_time(), 11.0);
        assert_eq!(outcome.elapsed_time, 11.0);
    }

    #[test]
    fn test_out_of_order_arrival_is_enqueued_late() {
        let outcome = simulate("10\n1 1 4 1 5\n2 1 1 1 5\n", &config(0.5, 1.0, 100.0, 1.0));
        assert_eq!(outcome.finished.len(), 2);
        // Enqueued at t=4 but accounted from its own arrival time.
        assert_eq!(find(&outcome, 2, 1).completion_time(), 2.0);
    }

    /// Deterministic workloads with times on a 0.1 grid
    fn decimal_workload(seed: u64) -> String {
        let mut state = seed;
        let mut next = |bound: u64| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) % bound
        };

        let mut input = String::from("10 10\n");
        let mut arrival = 0;
        for id in 1..=8 {
            arrival += next(15);
            let user = next(3) + 1;
            let burst = (next(50) + 1) as f64 / 10.0;
            let (cpu, mem) = (next(10) + 1, next(10) + 1);
            input.push_str(&format!(
                "{} {} {:.1} {:.1} {} {}\n",
                user,
                id,
                arrival as f64 / 10.0,
                burst,
                cpu,
                mem
            ));
        }
        input
    }

    #[test]
    fn test_decimal_times_drain_completely() {
        for lease_time in [0.1, 0.3, 0.7] {
            for seed in 0..100 {
                let input = decimal_workload(seed);
                let workload = Workload::parse(&input).unwrap();
                let policy = build_policy(&config(0.5, 1.0, 10.0, lease_time), workload.capacity)
                    .unwrap();

                let outcome = Simulator::new()
                    .run(policy, workload.tasks)
                    .unwrap_or_else(|e| panic!("lease {} seed {}: {}", lease_time, seed, e));
                assert_eq!(outcome.finished.len(), 8);
                for t in &outcome.finished {
                    assert_eq!(t.runtime(), t.burst_time);
                    let expected = t.arrival_time + t.waiting_time() + t.runtime();
                    assert!((t.completion_time() - expected).abs() < 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_zero_length_task_finishes() {
        let outcome = simulate("10\n1 1 0 0 5\n2 1 0 2 5\n", &config(0.5, 1.0, 100.0, 1.0));
        assert_eq!(outcome.finished.len(), 2);
        assert_eq!(find(&outcome, 1, 1).runtime(), 0.0);
    }

    #[test]
    fn test_empty_workload() {
        let outcome = simulate("10\n", &config(0.5, 1.0, 100.0, 1.0));
        assert!(outcome.finished.is_empty());
        assert_eq!(outcome.elapsed_time, 0.0);
    }
}
