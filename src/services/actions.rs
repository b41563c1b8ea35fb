use crate::api::TimelogApi;
use crate::display::{Badge, StatusDisplay};
use crate::error::{Result, SyncError};
use crate::host::PageHost;
use crate::messages::PageEvent;
use crate::models::{
    ActionResponse, Category, ExportFormat, Notification, StopResponse, TaskStartRequest,
    TrackingStatus,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const CLEAR_PROMPT: &str = "⚠️ 确定要清除所有时间记录数据吗？此操作不可恢复！";

/// The agent's operations, independent of when they are scheduled.
///
/// Cheap to clone: every field is shared. The cached status is the only
/// mutable state and is replaced wholesale by whichever fetch lands last.
#[derive(Clone)]
pub struct SyncCore {
    api: Arc<dyn TimelogApi>,
    display: Arc<dyn StatusDisplay>,
    host: Arc<dyn PageHost>,
    current: Arc<Mutex<Option<TrackingStatus>>>,
    reload_delay: Duration,
}

impl SyncCore {
    pub fn new(
        api: Arc<dyn TimelogApi>,
        display: Arc<dyn StatusDisplay>,
        host: Arc<dyn PageHost>,
        reload_delay: Duration,
    ) -> Self {
        Self {
            api,
            display,
            host,
            current: Arc::new(Mutex::new(None)),
            reload_delay,
        }
    }

    /// Last status that arrived, if any fetch has succeeded yet.
    pub fn current(&self) -> Option<TrackingStatus> {
        self.current
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn notify(&self, notification: Notification) {
        tracing::debug!("Toast ({:?}): {}", notification.kind, notification.message);
        self.display.show_toast(&notification);
    }

    /// Fetch the status and re-render the badge.
    ///
    /// Failures are only logged; the previous badge and cache stay as they were.
    pub async fn refresh_status(&self) -> Option<TrackingStatus> {
        match self.api.current_status().await {
            Ok(status) => {
                let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
                self.display.render_badge(&Badge::from_status(&status));
                *current = Some(status.clone());
                Some(status)
            }
            Err(e) => {
                tracing::error!("Failed to fetch status: {}", e);
                None
            }
        }
    }

    pub async fn start_task(
        &self,
        name: &str,
        category: Option<Category>,
    ) -> Result<ActionResponse> {
        let request = match TaskStartRequest::new(name, category) {
            Ok(request) => request,
            Err(e) => {
                self.notify(Notification::warning("请输入任务名称"));
                return Err(e);
            }
        };

        tracing::info!("Starting {} task: {}", request.category, request.task);
        match self.api.start_task(&request).await {
            Ok(response) if response.success => {
                self.notify(Notification::success(response.message.clone()));
                self.refresh_status().await;
                Ok(response)
            }
            Ok(response) => {
                tracing::warn!("Server refused to start task: {}", response.message);
                self.notify(Notification::danger(response.message.clone()));
                Err(SyncError::Remote(response.message))
            }
            Err(e) => {
                tracing::error!("Failed to start task: {}", e);
                self.notify(Notification::danger("开始任务失败，请重试"));
                Err(e)
            }
        }
    }

    pub async fn stop_task(&self) -> Result<StopResponse> {
        tracing::info!("Stopping current task");
        match self.api.stop_task().await {
            Ok(response) if response.success => {
                let duration = response.duration.unwrap_or_default();
                self.notify(Notification::success(format!(
                    "{}，持续 {} 分钟",
                    response.message, duration
                )));
                self.refresh_status().await;
                Ok(response)
            }
            Ok(response) => {
                tracing::warn!("Server refused to stop task: {}", response.message);
                self.notify(Notification::warning(response.message.clone()));
                Err(SyncError::Remote(response.message))
            }
            Err(e) => {
                tracing::error!("Failed to stop task: {}", e);
                self.notify(Notification::danger("停止任务失败，请重试"));
                Err(e)
            }
        }
    }

    /// Raw stats for the trailing `days` days; the server validates `days`.
    pub async fn stats_data(&self, days: u32) -> Result<Value> {
        self.api.stats_data(days).await.inspect_err(|e| {
            tracing::error!("Failed to fetch stats: {}", e);
            self.notify(Notification::danger("获取统计数据失败"));
        })
    }

    /// Wipe every record on the server after the user confirms.
    ///
    /// On success the host is reloaded once, `reload_delay` later, so the toast
    /// stays readable before the session resets.
    pub async fn clear_all_data(&self) -> Result<ActionResponse> {
        if !self.host.confirm(CLEAR_PROMPT).await {
            tracing::info!("Clear cancelled by user");
            return Err(SyncError::Cancelled);
        }

        match self.api.clear_data().await {
            Ok(response) if response.success => {
                self.notify(Notification::success(response.message.clone()));
                self.refresh_status().await;
                self.schedule_reload();
                Ok(response)
            }
            Ok(response) => {
                tracing::warn!("Server refused to clear data: {}", response.message);
                self.notify(Notification::danger("清除数据失败"));
                Err(SyncError::Remote("清除数据失败".into()))
            }
            Err(e) => {
                tracing::error!("Failed to clear data: {}", e);
                self.notify(Notification::danger("清除数据失败，请重试"));
                Err(e)
            }
        }
    }

    pub async fn export_data(&self, format: ExportFormat) -> Result<Vec<u8>> {
        self.api.export_data(format).await.inspect_err(|e| {
            tracing::error!("Failed to export data: {}", e);
            self.notify(Notification::danger("导出数据失败"));
        })
    }

    /// React to a page event. `Unload` is handled by the owning loop.
    pub async fn handle_event(&self, event: &PageEvent) {
        match event {
            PageEvent::Online => {
                tracing::info!("Network back online");
                self.notify(Notification::success("网络连接已恢复"));
                self.refresh_status().await;
            }
            PageEvent::Offline => {
                tracing::warn!("Network went offline");
                self.notify(Notification::warning("网络连接断开"));
            }
            PageEvent::Error(detail) => {
                tracing::error!("Page error: {}", detail);
                self.notify(Notification::danger("页面发生错误，请刷新重试"));
            }
            PageEvent::Unload => {}
        }
    }

    fn schedule_reload(&self) {
        let host = self.host.clone();
        let delay = self.reload_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            host.reload();
        });
    }
}
