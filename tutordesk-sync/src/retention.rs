//! Retention and cleanup policy.
//!
//! Automatic cleanup is age based and prunes both the activity log and the
//! repository links. Manual cleanup is total and touches the log only.

use crate::store::Store;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, broadcast};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use tutordesk_storage::StorageResult;
use tutordesk_types::RetentionPeriod;

/// Default period between automatic cleanup runs.
pub const DEFAULT_TICK: Duration = Duration::from_secs(24 * 60 * 60);

/// What an automatic cleanup pass removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CleanupReport {
    pub logs_removed: usize,
    pub repositories_removed: usize,
}

/// Oldest instant still retained for `period`.
pub fn cutoff(now: DateTime<Utc>, period: RetentionPeriod) -> DateTime<Utc> {
    now - period.as_duration()
}

impl Store {
    /// Age-based cleanup. A no-op returning `None` while retention is off.
    pub fn run_auto_cleanup(&mut self) -> StorageResult<Option<CleanupReport>> {
        self.run_auto_cleanup_at(Utc::now())
    }

    /// [`Store::run_auto_cleanup`] against an explicit clock.
    ///
    /// Entries stamped exactly at the cutoff are kept.
    pub fn run_auto_cleanup_at(
        &mut self,
        now: DateTime<Utc>,
    ) -> StorageResult<Option<CleanupReport>> {
        let setting = self.retention();
        if !setting.enabled {
            return Ok(None);
        }

        let limit = cutoff(now, setting.period);
        let report = CleanupReport {
            logs_removed: self.retain_logs_since(limit)?,
            repositories_removed: self.retain_repositories_since(limit)?,
        };
        info!(
            "retention cleanup ({}): removed {} logs, {} repositories",
            setting.period, report.logs_removed, report.repositories_removed
        );
        Ok(Some(report))
    }

    /// Empties the activity log regardless of the retention setting.
    pub fn run_manual_cleanup(&mut self) -> StorageResult<usize> {
        let removed = self.clear_all_logs()?;
        info!("manual cleanup removed {removed} logs");
        Ok(removed)
    }
}

/// Runs automatic cleanup on a fixed period.
pub struct RetentionScheduler {
    store: Arc<Mutex<Store>>,
    period: Duration,
    shutdown_tx: broadcast::Sender<()>,
}

impl RetentionScheduler {
    pub fn new(store: Arc<Mutex<Store>>, period: Duration) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            store,
            period,
            shutdown_tx,
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Ticks immediately, then once per period, until shutdown.
    pub async fn run(&self) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("retention scheduler started (every {:?})", self.period);

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("retention scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    debug!("retention tick");
                    let mut store = self.store.lock().await;
                    if let Err(e) = store.run_auto_cleanup() {
                        warn!("retention cleanup failed: {e}");
                    }
                }
            }
        }
    }
}
