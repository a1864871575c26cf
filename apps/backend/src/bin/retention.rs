//! One-shot retention run, for cron or manual maintenance.
//!
//! ```text
//! retention --job all
//! retention --job rankings
//! ```

use clap::{Parser, ValueEnum};
use sorter_backend::config::retention::RetentionConfig;
use sorter_backend::db::require_db;
use sorter_backend::jobs::{run_once, Job};
use sorter_backend::telemetry::init_tracing;
use sorter_backend::{build_state, AppError, DbProfile};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum JobArg {
    Archive,
    Cleanup,
    Rankings,
    All,
}

impl From<JobArg> for Job {
    fn from(arg: JobArg) -> Self {
        match arg {
            JobArg::Archive => Job::Archive,
            JobArg::Cleanup => Job::Cleanup,
            JobArg::Rankings => Job::Rankings,
            JobArg::All => Job::All,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "retention", about = "Run Sorter Master retention jobs once")]
struct Cli {
    /// Job to run
    #[arg(long, value_enum, default_value_t = JobArg::All)]
    job: JobArg,

    /// Print the report as JSON on stdout
    #[arg(long)]
    json: bool,
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let retention = RetentionConfig::from_env()?;
    let state = build_state()
        .with_db(DbProfile::Prod)
        .with_retention(retention.clone())
        .build()
        .await?;
    let db = require_db(&state)?;

    let report = run_once(db, &retention, cli.job.into()).await?;
    if cli.json {
        let encoded = serde_json::to_string_pretty(&report)
            .map_err(|e| AppError::internal(format!("encode report: {e}")))?;
        println!("{encoded}");
    }
    info!(job = ?cli.job, "retention run finished");
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!(error = %e, "retention run failed");
        std::process::exit(1);
    }
}
