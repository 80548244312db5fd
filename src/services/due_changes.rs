//! Due-change sweeper
//!
//! One sweep applies every pending change whose effective time has passed.
//! The timer-driven job and the manual trigger both call `sweep`, and may run
//! at the same time: `ScheduledChangeRegistry::apply` rejects an entry that is
//! already applied, so each change is applied once.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{PricingError, PricingResult};
use crate::models::sweep::{SweepReport, SweeperState};
use crate::services::scheduled_changes::ScheduledChangeRegistry;

#[derive(Clone)]
pub struct DueChangeSweeper {
    registry: ScheduledChangeRegistry,
    in_flight: Arc<AtomicUsize>,
}

/// Decrements the in-flight counter even if the sweep future is dropped
struct SweepGuard(Arc<AtomicUsize>);

impl Drop for SweepGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl DueChangeSweeper {
    pub fn new(registry: ScheduledChangeRegistry) -> Self {
        Self {
            registry,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn state(&self) -> SweeperState {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            SweeperState::Sweeping
        } else {
            SweeperState::Idle
        }
    }

    pub async fn sweep(&self) -> PricingResult<SweepReport> {
        self.sweep_at(Utc::now()).await
    }

    /// Apply every change due at `now`.
    ///
    /// Per-entry failures are logged and leave the entry pending; only a
    /// failure to list due changes fails the sweep itself.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> PricingResult<SweepReport> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let _guard = SweepGuard(self.in_flight.clone());

        let due = self.registry.list_due(now).await?;
        let mut report = SweepReport {
            swept_at: Some(now),
            due: due.len(),
            ..Default::default()
        };

        if due.is_empty() {
            debug!("No scheduled price changes due");
            return Ok(report);
        }

        info!(due = due.len(), "Applying due scheduled price changes");

        for change in due {
            match self.registry.apply_at(change.id, now).await {
                Ok(_) => report.applied += 1,
                Err(e) => {
                    if self.no_longer_pending(change.id).await {
                        // Applied or cancelled by a concurrent caller since the scan
                        debug!(change_id = change.id, error = %e, "Scheduled change no longer pending, skipping");
                        report.skipped += 1;
                    } else {
                        warn!(
                            change_id = change.id,
                            item_id = %change.item_id,
                            error = %e,
                            "Failed to apply scheduled price change, will retry next sweep"
                        );
                        report.failed_ids.push(change.id);
                    }
                }
            }
        }

        info!(
            applied = report.applied,
            skipped = report.skipped,
            failed = report.failed_ids.len(),
            "Scheduled price sweep complete"
        );
        Ok(report)
    }

    async fn no_longer_pending(&self, change_id: i64) -> bool {
        match self.registry.get(change_id).await {
            Ok(change) => change.applied,
            Err(PricingError::NotFound(_)) => true,
            Err(_) => false,
        }
    }
}
