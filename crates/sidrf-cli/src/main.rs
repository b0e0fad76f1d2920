//! sidrf CLI
//!
//! Runs a workload file through a fair-share scheduling policy and writes
//! per-task and per-user statistics.

mod commands;

use clap::Parser;
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// sidrf - offline multi-resource fair-share scheduling simulator
#[derive(Parser, Debug)]
#[command(name = "sidrf")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Workload file: a capacity line followed by one task per line
    input: PathBuf,

    /// Scheduling policy (SIDRF)
    policy: String,

    /// Weight of the resource share against cumulative runtime, in [0, 1]
    #[arg(allow_negative_numbers = true)]
    p: Option<f64>,

    /// Preemption trigger ratio of total waiting to total running time
    #[arg(allow_negative_numbers = true)]
    alpha: Option<f64>,

    /// Upper bound of the preemption threshold
    #[arg(allow_negative_numbers = true)]
    beta: Option<f64>,

    /// Lease time: maximum simulated time per scheduling step
    #[arg(allow_negative_numbers = true)]
    gamma: Option<f64>,

    /// TOML file supplying parameters not given on the command line
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for the result files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Print the full report as JSON
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(log_level: &str, verbose: bool) {
    let level = if verbose {
        Level::DEBUG
    } else {
        match log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "error" => Level::ERROR,
            _ => Level::WARN,
        }
    };

    // RUST_LOG wins over the command line when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.verbose);

    let params = commands::ParameterArgs {
        p: cli.p,
        alpha: cli.alpha,
        beta: cli.beta,
        lease_time: cli.gamma,
    };
    let config = commands::resolve_config(cli.config.as_deref(), &cli.policy, &params)?;

    let report = commands::simulate(&cli.input, &config)?;
    let name = sidrf_core::Workload::name_from_path(&cli.input);
    let written = commands::write_report(&report, &cli.output_dir, &name)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        commands::print_summary(&report, &written);
    }

    Ok(())
}
