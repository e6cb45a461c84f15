//! Periodic Scheduler
//!
//! Runs registered jobs once per fixed interval on a background task.
//!
//! ```text
//! start() ──▶ tick ──▶ job 1 ──▶ job 2 ──▶ … ──▶ wait interval ──▶ tick …
//!                         │ error / panic
//!                         └──▶ logged, next job / next pass still runs
//! ```
//!
//! Jobs in one pass run sequentially in registration order. A failing or
//! panicking job never stops the loop; only [`SchedulerHandle::shutdown`]
//! (or dropping the runtime) does.

use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::error::{BotError, Result};

/// Default delay between two passes (one hour)
pub const DEFAULT_INTERVAL_SECS: u64 = 3600;

/// A unit of periodic work
#[async_trait]
pub trait ScheduledJob: Send + Sync {
    /// Job name (for logs)
    fn name(&self) -> &str;

    /// Execute one pass. `now` is the local wall-clock time of the tick.
    async fn run_pass(&self, now: DateTime<Local>) -> Result<()>;
}

/// Scheduler configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Fixed delay between the start of two passes
    pub interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
        }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (`SCHEDULE_INTERVAL_SECS`)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(raw) = lookup("SCHEDULE_INTERVAL_SECS") else {
            return Ok(Self::default());
        };

        let secs: u64 = raw.trim().parse().map_err(|_| {
            BotError::Config(format!("SCHEDULE_INTERVAL_SECS must be a number, got '{raw}'"))
        })?;
        if secs == 0 {
            return Err(BotError::Config(
                "SCHEDULE_INTERVAL_SECS must be greater than zero".into(),
            ));
        }

        Ok(Self {
            interval: Duration::from_secs(secs),
        })
    }
}

/// Periodic job runner
pub struct Scheduler {
    config: SchedulerConfig,
    jobs: Vec<Arc<dyn ScheduledJob>>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            jobs: Vec::new(),
        }
    }

    /// Register a job; jobs run in registration order
    pub fn register<J: ScheduledJob + 'static>(&mut self, job: J) {
        self.jobs.push(Arc::new(job));
    }

    /// Spawn the loop on the current tokio runtime. The first pass runs
    /// immediately.
    pub fn start(self) -> SchedulerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let passes = Arc::new(AtomicU64::new(0));

        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            jobs = self.jobs.len(),
            "Scheduler started"
        );

        let task = tokio::spawn(run_loop(
            self.config.interval,
            self.jobs,
            shutdown_rx,
            Arc::clone(&passes),
        ));

        SchedulerHandle {
            shutdown: shutdown_tx,
            task,
            passes,
        }
    }
}

/// Handle to a running scheduler
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
    passes: Arc<AtomicU64>,
}

impl SchedulerHandle {
    /// Number of completed passes
    pub fn passes(&self) -> u64 {
        self.passes.load(Ordering::Relaxed)
    }

    /// Stop the loop after the current pass and wait for it to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::error!("Scheduler task ended abnormally: {}", e);
        }
        tracing::info!("Scheduler stopped");
    }
}

async fn run_loop(
    interval: Duration,
    jobs: Vec<Arc<dyn ScheduledJob>>,
    mut shutdown: watch::Receiver<bool>,
    passes: Arc<AtomicU64>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_pass(&jobs).await;
                passes.fetch_add(1, Ordering::Relaxed);
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
}

async fn run_pass(jobs: &[Arc<dyn ScheduledJob>]) {
    let now = Local::now();

    for job in jobs {
        let name = job.name().to_string();
        let job = Arc::clone(job);

        // Spawned so a panic inside the job surfaces as a JoinError.
        let outcome = tokio::spawn(async move { job.run_pass(now).await }).await;

        match outcome {
            Ok(Ok(())) => tracing::debug!(job = %name, "Scheduled pass completed"),
            Ok(Err(e)) => tracing::error!(
                job = %name,
                retryable = e.is_retryable(),
                "Scheduled pass failed: {}",
                e
            ),
            Err(e) => tracing::error!(
                job = %name,
                "{}: {}",
                BotError::JobAborted(name.clone()),
                e
            ),
        }
    }
}
