//! Scheduled price sweep job
//!
//! Runs the due-change sweep once shortly after startup and then on a fixed
//! period. Stops when the shutdown flag flips, but only between sweeps; a
//! sweep in progress always runs to completion so no change is left
//! half-applied.

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{error, info};

use crate::config::SweepConfig;
use crate::services::due_changes::DueChangeSweeper;

/// Start the scheduled price sweep job
///
/// # Arguments
///
/// * `sweeper` - Shared sweeper; the manual trigger uses the same instance
/// * `config` - Period and startup delay
/// * `shutdown` - Set to `true` (or drop the sender) to stop the job
pub fn start_scheduled_price_sweep_job(
    sweeper: DueChangeSweeper,
    config: SweepConfig,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            interval_secs = config.interval.as_secs(),
            initial_delay_secs = config.initial_delay.as_secs(),
            "Scheduled price sweep job started"
        );

        let mut interval = interval_at(Instant::now() + config.initial_delay, config.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown requested, stopping scheduled price sweep job");
                        break;
                    }
                }
                _ = interval.tick() => {
                    run_sweep(&sweeper).await;
                }
            }
        }

        info!("Scheduled price sweep job stopped");
    })
}

/// One timer-driven sweep; errors are logged and retried on the next tick
async fn run_sweep(sweeper: &DueChangeSweeper) {
    match sweeper.sweep().await {
        Ok(report) if report.due > 0 => {
            info!(
                due = report.due,
                applied = report.applied,
                skipped = report.skipped,
                failed = report.failed_ids.len(),
                "Timer sweep finished"
            );
        }
        Ok(_) => {}
        Err(e) => {
            error!(error = %e, "Scheduled price sweep failed");
        }
    }
}
