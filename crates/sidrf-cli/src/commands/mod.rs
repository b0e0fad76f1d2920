//! CLI commands implementation

use anyhow::{Context, Result};
use sidrf_core::{PolicyKind, SimulationConfig, SimulationReport, Workload};
use sidrf_scheduler::{build_policy, Simulator};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Numeric parameters given on the command line
#[derive(Debug, Clone, Default)]
pub struct ParameterArgs {
    pub p: Option<f64>,
    pub alpha: Option<f64>,
    pub beta: Option<f64>,
    pub lease_time: Option<f64>,
}

/// Result files written for a run
#[derive(Debug, Clone)]
pub struct WrittenFiles {
    pub tasks: PathBuf,
    pub users: PathBuf,
}

/// Layer defaults, an optional config file, and command-line values.
///
/// Without a config file every numeric parameter must be given explicitly.
pub fn resolve_config(
    config_path: Option<&Path>,
    policy: &str,
    params: &ParameterArgs,
) -> Result<SimulationConfig> {
    let policy: PolicyKind = policy.parse()?;

    let mut config = match config_path {
        Some(path) => SimulationConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => {
            let missing: Vec<&str> = [
                ("p", params.p),
                ("alpha", params.alpha),
                ("beta", params.beta),
                ("gamma", params.lease_time),
            ]
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| *name)
            .collect();
            if !missing.is_empty() {
                anyhow::bail!(
                    "Missing parameters: {} (pass them positionally or via --config)",
                    missing.join(", ")
                );
            }
            SimulationConfig::default()
        }
    };

    config.policy = policy;
    if let Some(p) = params.p {
        config.p = p;
    }
    if let Some(alpha) = params.alpha {
        config.alpha = alpha;
    }
    if let Some(beta) = params.beta {
        config.beta = beta;
    }
    if let Some(lease_time) = params.lease_time {
        config.lease_time = lease_time;
    }

    config.validate()?;
    Ok(config)
}

/// Load a workload and run it under `config`
pub fn simulate(input: &Path, config: &SimulationConfig) -> Result<SimulationReport> {
    let workload = Workload::from_file(input)
        .with_context(|| format!("Failed to load workload {}", input.display()))?;

    info!(
        input = %input.display(),
        resources = workload.num_resources(),
        tasks = workload.tasks.len(),
        "Loaded workload"
    );
    if !workload.is_arrival_ordered() {
        warn!("Workload arrivals are not in non-decreasing order; tasks are fed in file order");
    }

    let policy = build_policy(config, workload.capacity)?;
    let outcome = Simulator::new().run(policy, workload.tasks)?;

    Ok(SimulationReport::from_tasks(
        outcome.policy,
        &outcome.finished,
        outcome.counters,
    ))
}

/// Write `tasks_stat_<name>_<POLICY>` and `users_stat_<name>_<POLICY>`
pub fn write_report(report: &SimulationReport, dir: &Path, name: &str) -> Result<WrittenFiles> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let policy = report.summary.policy;
    let files = WrittenFiles {
        tasks: dir.join(format!("tasks_stat_{}_{}", name, policy)),
        users: dir.join(format!("users_stat_{}_{}", name, policy)),
    };

    write_lines(&files.tasks, report.tasks.iter().map(|s| s.to_line()))?;
    write_lines(&files.users, report.users.iter().map(|s| s.to_line()))?;

    info!(
        tasks = %files.tasks.display(),
        users = %files.users.display(),
        "Wrote result files"
    );

    Ok(files)
}

fn write_lines(path: &Path, lines: impl Iterator<Item = String>) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    for line in lines {
        writeln!(writer, "{}", line)?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Print a short human-readable summary
pub fn print_summary(report: &SimulationReport, written: &WrittenFiles) {
    let summary = &report.summary;
    println!("Policy: {}", summary.policy);
    println!("  Tasks: {}", summary.task_count);
    println!("  Users: {}", report.users.len());
    println!("  Makespan: {}", summary.makespan);
    println!("  Mean waiting time: {:.3}", summary.mean_waiting_time);
    println!("  Mean turnaround time: {:.3}", summary.mean_turnaround_time);
    println!(
        "  Admissions: {}, preemptions: {}",
        summary.admissions, summary.preemptions
    );
    println!();
    println!("Task stats: {}", written.tasks.display());
    println!("User stats: {}", written.users.display());
}
