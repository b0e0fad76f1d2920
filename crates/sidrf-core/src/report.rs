//! Simulation result reports

use serde::Serialize;
use std::collections::BTreeMap;

use crate::{PolicyKind, Task, TaskId, UserId};

/// Scheduling activity counted by a policy over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PolicyCounters {
    /// Tasks moved from waiting to running
    pub admissions: u64,
    /// Tasks evicted from running back to waiting
    pub preemptions: u64,
    /// Tasks moved to finished
    pub completions: u64,
}

/// Per-task result line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskStats {
    pub user_id: UserId,
    pub task_id: TaskId,
    pub arrival_time: f64,
    pub completion_time: f64,
    pub waiting_time: f64,
    pub turnaround_time: f64,
}

impl TaskStats {
    pub fn from_task(task: &Task) -> Self {
        Self {
            user_id: task.user_id,
            task_id: task.task_id,
            arrival_time: task.arrival_time,
            completion_time: task.completion_time(),
            waiting_time: task.waiting_time(),
            turnaround_time: task.turnaround_time(),
        }
    }

    /// `user_id completion_time waiting_time turnaround_time`
    pub fn to_line(&self) -> String {
        format!(
            "{} {} {} {}",
            self.user_id, self.completion_time, self.waiting_time, self.turnaround_time
        )
    }
}

/// Per-user aggregate line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub user_id: UserId,
    /// Sum of waiting time over all of the user's tasks
    pub total_waiting_time: f64,
    pub task_count: usize,
}

impl UserStats {
    /// `user_id total_waiting_time`
    pub fn to_line(&self) -> String {
        format!("{} {}", self.user_id, self.total_waiting_time)
    }
}

/// Aggregate figures for a whole run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub policy: PolicyKind,
    pub task_count: usize,
    /// Latest completion time over all tasks
    pub makespan: f64,
    pub mean_waiting_time: f64,
    pub mean_turnaround_time: f64,
    pub admissions: u64,
    pub preemptions: u64,
}

/// Full result of a simulation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub summary: SimulationSummary,
    /// Sorted by user, then task id
    pub tasks: Vec<TaskStats>,
    /// Sorted by user
    pub users: Vec<UserStats>,
}

impl SimulationReport {
    /// Build the report from finished tasks
    pub fn from_tasks(policy: PolicyKind, tasks: &[Task], counters: PolicyCounters) -> Self {
        let mut task_stats: Vec<TaskStats> = tasks.iter().map(TaskStats::from_task).collect();
        task_stats.sort_by_key(|s| (s.user_id, s.task_id));

        let mut per_user: BTreeMap<UserId, UserStats> = BTreeMap::new();
        for stats in &task_stats {
            let entry = per_user.entry(stats.user_id).or_insert(UserStats {
                user_id: stats.user_id,
                total_waiting_time: 0.0,
                task_count: 0,
            });
            entry.total_waiting_time += stats.waiting_time;
            entry.task_count += 1;
        }

        let task_count = task_stats.len();
        let mean = |f: fn(&TaskStats) -> f64| {
            if task_count == 0 {
                0.0
            } else {
                task_stats.iter().map(f).sum::<f64>() / task_count as f64
            }
        };

        let summary = SimulationSummary {
            policy,
            task_count,
            makespan: task_stats
                .iter()
                .map(|s| s.completion_time)
                .fold(0.0, f64::max),
            mean_waiting_time: mean(|s: &TaskStats| s.waiting_time),
            mean_turnaround_time: mean(|s: &TaskStats| s.turnaround_time),
            admissions: counters.admissions,
            preemptions: counters.preemptions,
        };

        Self {
            summary,
            tasks: task_stats,
            users: per_user.into_values().collect(),
        }
    }
}
