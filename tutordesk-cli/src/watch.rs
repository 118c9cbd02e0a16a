//! Long-running mode: push-driven refresh plus periodic retention.

use crate::app::App;
use crate::config::Mode;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};
use tutordesk_api::PushSubscriber;
use tutordesk_sync::{PushDispatcher, RetentionScheduler};

/// Runs until ctrl-c.
pub async fn run(app: &App) -> Result<()> {
    let session = app.session.clone();

    if let Err(e) = session.refresh_all().await {
        warn!("initial refresh failed: {e}");
    }

    let scheduler = Arc::new(RetentionScheduler::new(
        session.store().clone(),
        app.config.retention_tick(),
    ));
    let scheduler_task = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move { scheduler.run().await })
    };

    // Local mode has no push server to listen to
    let push = match app.config.mode {
        Mode::Remote => {
            let subscriber = Arc::new(
                PushSubscriber::new(&app.config.client).context("invalid push configuration")?,
            );
            let dispatcher = PushDispatcher::new(session.clone());
            let signals = subscriber.subscribe();
            let dispatcher_task = tokio::spawn(async move { dispatcher.run(signals).await });
            let subscriber_task = {
                let subscriber = subscriber.clone();
                tokio::spawn(async move { subscriber.run().await })
            };
            Some((subscriber, subscriber_task, dispatcher_task))
        }
        Mode::Local => None,
    };

    info!("watching for changes, press ctrl-c to stop");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    info!("shutting down");

    scheduler.shutdown();
    if let Some((subscriber, subscriber_task, dispatcher_task)) = push {
        subscriber.shutdown();
        let _ = subscriber_task.await;
        // The dispatcher stops once the last signal sender is gone
        drop(subscriber);
        let _ = dispatcher_task.await;
    }
    let _ = scheduler_task.await;
    Ok(())
}
