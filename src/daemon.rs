//! Scheduled checking of every active blog.
//!
//! Runs one batch per interval in the foreground until SIGINT or SIGTERM.
//! Meant to be supervised by whatever keeps the process alive (systemd, a
//! container runtime, a terminal multiplexer).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::app::{AppContext, BlogwatchError, Result};

/// Longest accepted interval: one year.
pub const MAX_INTERVAL_SECS: u64 = 365 * 86400;

/// Watch loop configuration
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Time between runs (default: 1 day)
    pub interval: Duration,
    /// Whether to run a check immediately on start
    pub run_on_start: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(86400),
            run_on_start: true,
        }
    }
}

impl DaemonConfig {
    /// Parse interval string like "1h", "30m", "6h", "1d"
    pub fn parse_interval(s: &str) -> std::result::Result<u64, String> {
        let s = s.trim().to_lowercase();

        let (number, unit, label) = if let Some(hours) = s.strip_suffix('h') {
            (hours, 3600, "hours")
        } else if let Some(minutes) = s.strip_suffix('m') {
            (minutes, 60, "minutes")
        } else if let Some(days) = s.strip_suffix('d') {
            (days, 86400, "days")
        } else if let Some(secs) = s.strip_suffix('s') {
            (secs, 1, "seconds")
        } else {
            (s.as_str(), 1, "interval")
        };

        let count = number.parse::<u64>().map_err(|_| {
            if label == "interval" {
                format!("Invalid interval: {}. Use format like '1h', '30m', '1d'", s)
            } else {
                format!("Invalid {}: {}", label, number)
            }
        })?;

        let secs = count
            .checked_mul(unit)
            .filter(|secs| *secs <= MAX_INTERVAL_SECS)
            .ok_or_else(|| {
                format!(
                    "Interval too long: {}. The maximum is {}",
                    s,
                    Self::format_interval(MAX_INTERVAL_SECS)
                )
            })?;

        if secs == 0 {
            return Err("Interval must be greater than zero".to_string());
        }
        Ok(secs)
    }

    /// Format interval for display
    pub fn format_interval(secs: u64) -> String {
        if secs >= 86400 && secs % 86400 == 0 {
            format!("{}d", secs / 86400)
        } else if secs >= 3600 && secs % 3600 == 0 {
            format!("{}h", secs / 3600)
        } else if secs >= 60 && secs % 60 == 0 {
            format!("{}m", secs / 60)
        } else {
            format!("{}s", secs)
        }
    }

    pub fn from_args(interval: &str, no_initial_run: bool) -> Result<Self> {
        let secs = Self::parse_interval(interval).map_err(BlogwatchError::Config)?;
        Ok(Self {
            interval: Duration::from_secs(secs),
            run_on_start: !no_initial_run,
        })
    }
}

pub struct Daemon {
    ctx: Arc<AppContext>,
    config: DaemonConfig,
}

impl Daemon {
    pub fn new(ctx: Arc<AppContext>, config: DaemonConfig) -> Self {
        Self { ctx, config }
    }

    /// Run until SIGINT or SIGTERM.
    pub async fn run(&self) -> Result<()> {
        let shutdown = shutdown_signal()?;
        let runs = self.run_until(shutdown).await;
        tracing::info!(runs, "Watcher stopped");
        Ok(())
    }

    /// Run until `shutdown` completes and return the number of batches run.
    pub async fn run_until<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        tracing::info!(
            interval = %DaemonConfig::format_interval(self.config.interval.as_secs()),
            pid = std::process::id(),
            "Watcher started"
        );

        let mut runs = 0;
        if self.config.run_on_start {
            self.run_once().await;
            runs += 1;
        }

        let mut timer = interval_at(Instant::now() + self.config.interval, self.config.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = timer.tick() => {
                    self.run_once().await;
                    runs += 1;
                }
            }
        }

        runs
    }

    async fn run_once(&self) {
        match self.ctx.batch_runner().run().await {
            Ok(summary) => tracing::info!(
                checked = summary.checked,
                updated = summary.updated,
                new_posts = summary.new_posts,
                "Scheduled check complete"
            ),
            Err(e) => tracing::error!(error = %e, "Scheduled check failed"),
        }
    }
}

#[cfg(unix)]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    Ok(async move {
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv() => {},
        }
    })
}

#[cfg(not(unix))]
fn shutdown_signal() -> Result<impl Future<Output = ()>> {
    Ok(async {
        let _ = tokio::signal::ctrl_c().await;
    })
}
