//! Workload input parsing
//!
//! The input format is plain text. The first non-blank line holds the total
//! capacity of every resource dimension; each following non-blank line is a
//! task:
//!
//! ```text
//! 10 8
//! 1 1 0 5 4 2
//! 2 1 0.5 3 6 1
//! ```
//!
//! Task lines are `user_id task_id arrival_time burst_time demand_1 .. demand_R`.

use std::path::Path;
use std::str::FromStr;

use crate::{SidrfError, SidrfResult, Task, TaskId, UserId};

/// Number of fields preceding the demand vector on a task line
const TASK_HEADER_FIELDS: usize = 4;

/// Parsed scenario: capacities plus tasks in file order
#[derive(Debug, Clone, PartialEq)]
pub struct Workload {
    /// Total capacity per resource dimension
    pub capacity: Vec<f64>,
    /// Tasks in the order they appear in the input
    pub tasks: Vec<Task>,
}

impl Workload {
    /// Read and parse a workload file
    pub fn from_file(path: &Path) -> SidrfResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse workload text
    pub fn parse(input: &str) -> SidrfResult<Self> {
        let mut lines = input
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line))
            .filter(|(_, line)| !line.trim().is_empty());

        let (cap_line, cap_text) = lines
            .next()
            .ok_or_else(|| SidrfError::parse(1, "missing capacity line"))?;
        let capacity = parse_capacity(cap_line, cap_text)?;

        let tasks = lines
            .map(|(line_no, text)| parse_task(line_no, text, &capacity))
            .collect::<SidrfResult<Vec<_>>>()?;

        Ok(Self { capacity, tasks })
    }

    pub fn num_resources(&self) -> usize {
        self.capacity.len()
    }

    /// Whether arrival times never decrease in file order
    pub fn is_arrival_ordered(&self) -> bool {
        self.tasks
            .windows(2)
            .all(|w| w[0].arrival_time <= w[1].arrival_time)
    }

    /// Scenario name derived from a path: the base name up to its first `.`
    pub fn name_from_path(path: &Path) -> String {
        path.file_name()
            .map(|name| name.to_string_lossy())
            .and_then(|name| name.split('.').next().map(str::to_string))
            .unwrap_or_default()
    }
}

fn parse_number<T: FromStr>(line: usize, field: &str, token: &str) -> SidrfResult<T> {
    token
        .parse()
        .map_err(|_| SidrfError::parse(line, format!("invalid {} '{}'", field, token)))
}

fn parse_capacity(line: usize, text: &str) -> SidrfResult<Vec<f64>> {
    let capacity = text
        .split_whitespace()
        .map(|tok| parse_number::<f64>(line, "capacity", tok))
        .collect::<SidrfResult<Vec<_>>>()?;

    if let Some(bad) = capacity.iter().find(|c| !c.is_finite() || **c <= 0.0) {
        return Err(SidrfError::parse(
            line,
            format!("capacity must be positive, got {}", bad),
        ));
    }

    Ok(capacity)
}

fn parse_task(line: usize, text: &str, capacity: &[f64]) -> SidrfResult<Task> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let expected = TASK_HEADER_FIELDS + capacity.len();
    if tokens.len() != expected {
        return Err(SidrfError::parse(
            line,
            format!(
                "expected {} fields ({} resource demands), found {}",
                expected,
                capacity.len(),
                tokens.len()
            ),
        ));
    }

    let user_id: UserId = parse_number(line, "user id", tokens[0])?;
    let task_id: TaskId = parse_number(line, "task id", tokens[1])?;
    let arrival_time: f64 = parse_number(line, "arrival time", tokens[2])?;
    let burst_time: f64 = parse_number(line, "burst time", tokens[3])?;
    let demand = tokens[TASK_HEADER_FIELDS..]
        .iter()
        .map(|tok| parse_number::<f64>(line, "resource demand", tok))
        .collect::<SidrfResult<Vec<_>>>()?;

    for (field, value) in [("arrival time", arrival_time), ("burst time", burst_time)] {
        if !value.is_finite() || value < 0.0 {
            return Err(SidrfError::parse(
                line,
                format!("{} must be non-negative, got {}", field, value),
            ));
        }
    }

    for (dim, (d, cap)) in demand.iter().zip(capacity).enumerate() {
        if !d.is_finite() || *d < 0.0 {
            return Err(SidrfError::parse(
                line,
                format!("demand for resource {} must be non-negative, got {}", dim, d),
            ));
        }
        // Such a task could never be admitted.
        if d > cap {
            return Err(SidrfError::parse(
                line,
                format!(
                    "demand {} for resource {} exceeds total capacity {}",
                    d, dim, cap
                ),
            ));
        }
    }

    Ok(Task::new(user_id, task_id, arrival_time, burst_time, demand))
}
