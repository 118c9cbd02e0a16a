//! Push dispatcher - turns "data updated" signals into re-fetches.

use crate::error::SyncResult;
use crate::session::AdminSession;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};
use tutordesk_api::PushSignal;
use tutordesk_types::{DashboardStats, SyncModule};

/// Maps each push signal to the re-fetch of its module.
pub struct PushDispatcher {
    session: Arc<AdminSession>,
    stats_tx: watch::Sender<Option<DashboardStats>>,
}

impl PushDispatcher {
    pub fn new(session: Arc<AdminSession>) -> Self {
        let (stats_tx, _) = watch::channel(None);
        Self { session, stats_tx }
    }

    /// Latest dashboard stats, refreshed after every handled signal.
    pub fn stats(&self) -> watch::Receiver<Option<DashboardStats>> {
        self.stats_tx.subscribe()
    }

    /// Handles one signal. Unknown module names are ignored and yield `None`.
    pub async fn handle(&self, signal: &PushSignal) -> SyncResult<Option<SyncModule>> {
        let module = match signal.module() {
            Ok(module) => module,
            Err(e) => {
                debug!("ignoring push signal: {e}");
                return Ok(None);
            }
        };

        debug!("push signal for {module}");
        self.session.refresh(module).await?;
        self.refresh_stats().await;
        Ok(Some(module))
    }

    async fn refresh_stats(&self) {
        let stats = self.session.dashboard_stats().await;
        self.stats_tx.send_replace(stats);
    }

    /// Consumes signals until the channel closes.
    ///
    /// Lagging behind the channel drops signals; every module is re-fetched
    /// to make up for them.
    pub async fn run(&self, mut signals: broadcast::Receiver<PushSignal>) {
        info!("push dispatcher started");
        loop {
            match signals.recv().await {
                Ok(signal) => {
                    if let Err(e) = self.handle(&signal).await {
                        warn!("push refresh for {} failed: {e}", signal.module);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("push dispatcher lagged by {skipped} signals, refreshing everything");
                    if let Err(e) = self.session.refresh_all().await {
                        warn!("full refresh failed: {e}");
                    }
                    self.refresh_stats().await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        info!("push dispatcher stopped");
    }
}
