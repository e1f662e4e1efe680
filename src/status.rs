use crate::client::HealthProbe;
use crate::types::ApiStatus;
use log::{error, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

/// Periodically probes the service and publishes its status.
///
/// The first probe runs immediately. The task stops on [`StatusMonitor::stop`]
/// or when the monitor is dropped.
pub struct StatusMonitor {
    status: watch::Receiver<ApiStatus>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl StatusMonitor {
    pub fn start<P>(probe: Arc<P>, interval: Duration) -> Self
    where
        P: HealthProbe + ?Sized + 'static,
    {
        let (tx, rx) = watch::channel(ApiStatus::Unknown);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {}
                }
                // A probe in flight must not hold up shutdown.
                let status = tokio::select! {
                    _ = &mut shutdown_rx => break,
                    status = probe.probe() => status,
                };
                tx.send_if_modified(|current| {
                    if *current == status {
                        return false;
                    }
                    info!("API status changed: {} -> {}", current, status);
                    *current = status;
                    true
                });
            }
            info!("Status monitor stopped");
        });
        StatusMonitor {
            status: rx,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    pub fn status(&self) -> ApiStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ApiStatus> {
        self.status.clone()
    }

    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Status monitor task failed: {}", e);
            }
        }
    }
}

impl Drop for StatusMonitor {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
