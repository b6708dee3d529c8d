//! sync-queue - drain a simulated workload through a sequential task queue
//!
//! Useful for watching progress reporting, fail-fast and abort behaviour
//! from the command line.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use sync_queue::app::{self, SimulatedWorkload};
use sync_queue::{AbortFlag, LoggingListener, ProgressSnapshot, QueueSettings, TaskQueue};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sync-queue", version, about)]
struct Args {
    /// Number of simulated tasks
    #[arg(long, default_value_t = 10)]
    tasks: usize,

    /// Number of add/execute phases the tasks are split into
    #[arg(long, default_value_t = 2)]
    phases: usize,

    /// Index of a task that should fail
    #[arg(long)]
    fail_at: Option<usize>,

    /// Abort after this many tasks have completed
    #[arg(long)]
    abort_after: Option<usize>,

    /// Time each simulated task takes, in milliseconds
    #[arg(long, default_value_t = 50)]
    delay_ms: u64,

    /// Settings file (defaults to the user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print snapshots and the final report as JSON lines
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => QueueSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => QueueSettings::load_or_default(&QueueSettings::default_path())?,
    };

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.as_str()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let flag = AbortFlag::new();
    let queue = if args.json {
        TaskQueue::with_settings(settings.clone(), flag.clone(), |s: &ProgressSnapshot| {
            match serde_json::to_string(s) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!("Failed to serialize snapshot: {}", e),
            }
        })
    } else {
        TaskQueue::with_settings(
            settings.clone(),
            flag.clone(),
            LoggingListener::new(settings.name.clone()),
        )
    };

    let workload = SimulatedWorkload {
        tasks: args.tasks,
        phases: args.phases,
        fail_at: args.fail_at,
        delay: Duration::from_millis(args.delay_ms),
    };

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(async {
        if let Some(limit) = args.abort_after {
            queue.subscribe(app::abort_after(flag.clone(), limit)).await;
        }
        app::run(&queue, &workload).await
    })?;

    if args.json {
        println!("{}", serde_json::to_string(&report)?);
    } else {
        for outcome in &report.outcomes {
            println!("{}", outcome);
        }
        println!("{} task(s) pending", report.pending);
    }

    if !report.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
