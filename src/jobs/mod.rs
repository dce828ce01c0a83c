//! Scheduled jobs
//!
//! Each job calls the API in-process, then appends timestamped plain-text
//! lines to its own log file. Jobs run on fixed intervals from
//! [`JobsConfig`]; a failed run is logged and the schedule carries on.

/// Liveness heartbeat
pub mod heartbeat;
/// Recent order reminders
pub mod reminders;
/// Weekly CRM report
pub mod report;
/// Low-stock replenishment
pub mod restock;

use crate::{
    config::{JobConfig, JobsConfig},
    errors::Result,
};
use sea_orm::DatabaseConnection;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info};

/// The scheduled jobs this service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Heartbeat against the `hello` query
    Heartbeat,
    /// `updateLowStockProducts` mutation
    LowStock,
    /// Customer/order/revenue summary
    Report,
    /// Orders placed in the last week
    OrderReminders,
}

impl Job {
    /// Every job, in scheduling order
    pub const ALL: [Self; 4] = [
        Self::Heartbeat,
        Self::LowStock,
        Self::Report,
        Self::OrderReminders,
    ];

    /// Short name used in logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Heartbeat => "heartbeat",
            Self::LowStock => "low_stock",
            Self::Report => "report",
            Self::OrderReminders => "order_reminders",
        }
    }

    /// Picks this job's settings out of the jobs section.
    #[must_use]
    pub const fn config(self, jobs: &JobsConfig) -> &JobConfig {
        match self {
            Self::Heartbeat => &jobs.heartbeat,
            Self::LowStock => &jobs.low_stock,
            Self::Report => &jobs.report,
            Self::OrderReminders => &jobs.order_reminders,
        }
    }

    /// Runs the job once, writing to `log_path`.
    pub async fn run_once(self, db: &DatabaseConnection, log_path: &Path) -> Result<()> {
        match self {
            Self::Heartbeat => heartbeat::run(db, log_path).await,
            Self::LowStock => restock::run(db, log_path).await,
            Self::Report => report::run(db, log_path).await,
            Self::OrderReminders => reminders::run(db, log_path).await,
        }
    }
}

/// Appends lines to a log file, creating it and its parent directory if needed.
pub async fn append_lines(path: &Path, lines: &[String]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;

    let mut buffer = String::new();
    for line in lines {
        buffer.push_str(line);
        buffer.push('\n');
    }
    file.write_all(buffer.as_bytes()).await?;
    file.flush().await?;
    Ok(())
}

/// Spawns one background task per enabled job.
///
/// The first run of each job happens one interval after start-up.
pub fn spawn_scheduled(db: &DatabaseConnection, jobs: &JobsConfig) -> Vec<JoinHandle<()>> {
    Job::ALL
        .into_iter()
        .filter_map(|job| {
            let config = job.config(jobs).clone();
            if !config.enabled {
                info!("Job {} is disabled", job.name());
                return None;
            }
            Some(tokio::spawn(run_schedule(job, db.clone(), config)))
        })
        .collect()
}

async fn run_schedule(job: Job, db: DatabaseConnection, config: JobConfig) {
    let period = Duration::from_secs(config.interval_secs.max(1));
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    info!(
        "Scheduled job {} every {}s, logging to {}",
        job.name(),
        period.as_secs(),
        config.log_path.display()
    );

    loop {
        ticker.tick().await;
        match job.run_once(&db, &config.log_path).await {
            Ok(()) => debug!("Job {} finished", job.name()),
            Err(e) => error!("Job {} failed: {}", job.name(), e),
        }
    }
}
