use crate::error::Result;
use crate::models::{
    ActionResponse, Category, ExportFormat, StopResponse, TrackingStatus,
};
use serde_json::Value;
use tokio::sync::{broadcast, oneshot};

/// Commands for the StatusSync service
pub enum SyncCommand {
    Refresh(oneshot::Sender<Option<TrackingStatus>>),
    StartTask {
        name: String,
        category: Option<Category>,
        reply: oneshot::Sender<Result<ActionResponse>>,
    },
    StopTask(oneshot::Sender<Result<StopResponse>>),
    Stats {
        days: u32,
        reply: oneshot::Sender<Result<Value>>,
    },
    ClearAll(oneshot::Sender<Result<ActionResponse>>),
    Export {
        format: ExportFormat,
        reply: oneshot::Sender<Result<Vec<u8>>>,
    },
    Current(oneshot::Sender<Option<TrackingStatus>>),
}

/// Page-level events published by the host (observable via broadcast channel)
#[derive(Clone, Debug, PartialEq)]
pub enum PageEvent {
    Online,
    Offline,
    Error(String),
    Unload,
}

/// Publish a page error, logging it when no session is listening.
///
/// Returns whether any agent received it.
pub fn publish_error(events: &broadcast::Sender<PageEvent>, message: String) -> bool {
    match events.send(PageEvent::Error(message)) {
        Ok(_) => true,
        Err(broadcast::error::SendError(event)) => {
            tracing::error!("No session to report page error: {:?}", event);
            false
        }
    }
}
