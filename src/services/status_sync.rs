use crate::error::{Result, SyncError};
use crate::messages::{PageEvent, SyncCommand};
use crate::models::{
    ActionResponse, Category, ExportFormat, StopResponse, TrackingStatus,
};
use crate::services::SyncCore;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::MissedTickBehavior;

/// Keeps the displayed status in sync with the server
///
/// This service:
/// - Polls the status once at startup and then on a fixed period
/// - Polls again when the page reports the network is back online
/// - Runs commands from `StatusSyncHandle` without blocking the poller
/// - Owns the page event subscription and drops it on unload
///
/// Polls and actions each run in their own task, so they are unordered with
/// respect to each other. Whichever status response lands last is displayed.
pub struct StatusSync {
    core: SyncCore,
    cmd_rx: mpsc::Receiver<SyncCommand>,
    events: broadcast::Receiver<PageEvent>,
    poll_interval: Duration,
}

impl StatusSync {
    pub fn new(
        core: SyncCore,
        cmd_rx: mpsc::Receiver<SyncCommand>,
        events: &broadcast::Sender<PageEvent>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            core,
            cmd_rx,
            events: events.subscribe(),
            poll_interval,
        }
    }

    /// Build the service and its handle, and spawn it on the runtime.
    pub fn spawn(
        core: SyncCore,
        events: &broadcast::Sender<PageEvent>,
        poll_interval: Duration,
    ) -> (StatusSyncHandle, tokio::task::JoinHandle<()>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(10);
        let service = Self::new(core, cmd_rx, events, poll_interval);
        (StatusSyncHandle::new(cmd_tx), tokio::spawn(service.run()))
    }

    pub async fn run(mut self) {
        // First tick completes immediately, which gives the startup poll
        let mut interval = tokio::time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!("Status sync started (interval: {:?})", self.poll_interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    tracing::debug!("Poll tick");
                    self.spawn_refresh();
                }

                cmd = self.cmd_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => {
                        tracing::debug!("All handles dropped");
                        break;
                    }
                },

                event = self.events.recv() => match event {
                    Ok(PageEvent::Unload) => {
                        tracing::debug!("Page unloading");
                        break;
                    }
                    Ok(event) => {
                        let core = self.core.clone();
                        tokio::spawn(async move { core.handle_event(&event).await });
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!("Missed {} page events", skipped);
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Page event bus closed");
                        break;
                    }
                },
            }
        }

        // Cancels the poll timer and unregisters from the event bus
        drop(interval);
        drop(self.events);
        tracing::info!("Status sync stopped");
    }

    fn spawn_refresh(&self) {
        let core = self.core.clone();
        tokio::spawn(async move {
            core.refresh_status().await;
        });
    }

    fn handle_command(&self, cmd: SyncCommand) {
        let core = self.core.clone();

        // Replies are dropped silently if the caller stopped waiting
        tokio::spawn(async move {
            match cmd {
                SyncCommand::Refresh(reply) => {
                    let _ = reply.send(core.refresh_status().await);
                }
                SyncCommand::StartTask {
                    name,
                    category,
                    reply,
                } => {
                    let _ = reply.send(core.start_task(&name, category).await);
                }
                SyncCommand::StopTask(reply) => {
                    let _ = reply.send(core.stop_task().await);
                }
                SyncCommand::Stats { days, reply } => {
                    let _ = reply.send(core.stats_data(days).await);
                }
                SyncCommand::ClearAll(reply) => {
                    let _ = reply.send(core.clear_all_data().await);
                }
                SyncCommand::Export { format, reply } => {
                    let _ = reply.send(core.export_data(format).await);
                }
                SyncCommand::Current(reply) => {
                    let _ = reply.send(core.current());
                }
            }
        });
    }
}

/// Handle for communicating with StatusSync
#[derive(Clone)]
pub struct StatusSyncHandle {
    tx: mpsc::Sender<SyncCommand>,
}

impl StatusSyncHandle {
    pub fn new(tx: mpsc::Sender<SyncCommand>) -> Self {
        Self { tx }
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> SyncCommand) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| SyncError::AgentGone)?;

        rx.await.map_err(|_| SyncError::AgentGone)
    }

    /// Poll right away. `None` if the fetch failed.
    pub async fn refresh(&self) -> Result<Option<TrackingStatus>> {
        self.request(SyncCommand::Refresh).await
    }

    pub async fn current_status(&self) -> Result<Option<TrackingStatus>> {
        self.request(SyncCommand::Current).await
    }

    pub async fn start_task(
        &self,
        name: impl Into<String>,
        category: Option<Category>,
    ) -> Result<ActionResponse> {
        let name = name.into();
        self.request(|reply| SyncCommand::StartTask {
            name,
            category,
            reply,
        })
        .await?
    }

    pub async fn stop_task(&self) -> Result<StopResponse> {
        self.request(SyncCommand::StopTask).await?
    }

    pub async fn stats_data(&self, days: u32) -> Result<Value> {
        self.request(|reply| SyncCommand::Stats { days, reply })
            .await?
    }

    pub async fn clear_all_data(&self) -> Result<ActionResponse> {
        self.request(SyncCommand::ClearAll).await?
    }

    pub async fn export_data(&self, format: ExportFormat) -> Result<Vec<u8>> {
        self.request(|reply| SyncCommand::Export { format, reply })
            .await?
    }
}
