//! Fakes shared by the unit tests.

use crate::api::TimelogApi;
use crate::display::{Badge, StatusDisplay};
use crate::error::{Result, SyncError};
use crate::host::PageHost;
use crate::models::{
    ActionResponse, Category, ExportFormat, Notification, StopResponse, TaskStartRequest,
    TrackingStatus,
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

pub fn active_status(category: Category, duration: f64) -> TrackingStatus {
    TrackingStatus {
        active: true,
        category: Some(category),
        duration,
        task: Some("task".into()),
        start_time: None,
    }
}

struct StatusReply {
    result: Result<TrackingStatus>,
    delay: Duration,
}

/// Scripted `TimelogApi` that records every call.
///
/// Status replies are served from a queue; an empty queue answers idle.
/// `fail_actions` makes the next non-status call fail once.
pub struct FakeApi {
    statuses: Mutex<VecDeque<StatusReply>>,
    status_calls: AtomicUsize,
    other_calls: AtomicUsize,
    start_requests: Mutex<Vec<TaskStartRequest>>,
    stats_days: Mutex<Vec<u32>>,
    start_response: Mutex<ActionResponse>,
    stop_response: Mutex<StopResponse>,
    clear_response: Mutex<ActionResponse>,
    stats: Mutex<Value>,
    action_error: Mutex<Option<SyncError>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            statuses: Mutex::new(VecDeque::new()),
            status_calls: AtomicUsize::new(0),
            other_calls: AtomicUsize::new(0),
            start_requests: Mutex::new(Vec::new()),
            stats_days: Mutex::new(Vec::new()),
            start_response: Mutex::new(ActionResponse {
                success: true,
                message: "已开始任务".into(),
            }),
            stop_response: Mutex::new(StopResponse {
                success: true,
                message: "已结束任务".into(),
                duration: Some(1.0),
            }),
            clear_response: Mutex::new(ActionResponse {
                success: true,
                message: "所有数据已清除".into(),
            }),
            stats: Mutex::new(json!({})),
            action_error: Mutex::new(None),
        }
    }

    pub fn push_status(&self, status: TrackingStatus) {
        self.push_delayed_status(status, Duration::ZERO);
    }

    pub fn push_delayed_status(&self, status: TrackingStatus, delay: Duration) {
        self.statuses.lock().unwrap().push_back(StatusReply {
            result: Ok(status),
            delay,
        });
    }

    pub fn fail_status(&self, error: SyncError) {
        self.statuses.lock().unwrap().push_back(StatusReply {
            result: Err(error),
            delay: Duration::ZERO,
        });
    }

    pub fn fail_actions(&self, error: SyncError) {
        *self.action_error.lock().unwrap() = Some(error);
    }

    pub fn set_start_response(&self, success: bool, message: &str) {
        *self.start_response.lock().unwrap() = ActionResponse {
            success,
            message: message.into(),
        };
    }

    pub fn set_stop_response(&self, success: bool, message: &str, duration: Option<f64>) {
        *self.stop_response.lock().unwrap() = StopResponse {
            success,
            message: message.into(),
            duration,
        };
    }

    pub fn set_clear_response(&self, success: bool, message: &str) {
        *self.clear_response.lock().unwrap() = ActionResponse {
            success,
            message: message.into(),
        };
    }

    pub fn set_stats(&self, stats: Value) {
        *self.stats.lock().unwrap() = stats;
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.status_calls() + self.other_calls.load(Ordering::SeqCst)
    }

    pub fn start_requests(&self) -> Vec<TaskStartRequest> {
        self.start_requests.lock().unwrap().clone()
    }

    pub fn stats_days(&self) -> Vec<u32> {
        self.stats_days.lock().unwrap().clone()
    }

    fn take_action_error(&self) -> Result<()> {
        self.other_calls.fetch_add(1, Ordering::SeqCst);
        match self.action_error.lock().unwrap().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl TimelogApi for FakeApi {
    async fn current_status(&self) -> Result<TrackingStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.statuses.lock().unwrap().pop_front();
        match reply {
            Some(reply) => {
                if !reply.delay.is_zero() {
                    tokio::time::sleep(reply.delay).await;
                }
                reply.result
            }
            None => Ok(TrackingStatus::default()),
        }
    }

    async fn start_task(&self, request: &TaskStartRequest) -> Result<ActionResponse> {
        self.start_requests.lock().unwrap().push(request.clone());
        self.take_action_error()?;
        Ok(self.start_response.lock().unwrap().clone())
    }

    async fn stop_task(&self) -> Result<StopResponse> {
        self.take_action_error()?;
        Ok(self.stop_response.lock().unwrap().clone())
    }

    async fn stats_data(&self, days: u32) -> Result<Value> {
        self.stats_days.lock().unwrap().push(days);
        self.take_action_error()?;
        Ok(self.stats.lock().unwrap().clone())
    }

    async fn clear_data(&self) -> Result<ActionResponse> {
        self.take_action_error()?;
        Ok(self.clear_response.lock().unwrap().clone())
    }

    async fn export_data(&self, format: ExportFormat) -> Result<Vec<u8>> {
        self.take_action_error()?;
        Ok(format.as_str().as_bytes().to_vec())
    }
}

#[derive(Default)]
pub struct RecordingDisplay {
    badges: Mutex<Vec<Badge>>,
    toasts: Mutex<Vec<Notification>>,
}

impl RecordingDisplay {
    pub fn badges(&self) -> Vec<Badge> {
        self.badges.lock().unwrap().clone()
    }

    pub fn toasts(&self) -> Vec<Notification> {
        self.toasts.lock().unwrap().clone()
    }
}

impl StatusDisplay for RecordingDisplay {
    fn render_badge(&self, badge: &Badge) {
        self.badges.lock().unwrap().push(badge.clone());
    }

    fn show_toast(&self, notification: &Notification) {
        self.toasts.lock().unwrap().push(notification.clone());
    }
}

pub struct FakeHost {
    answer: bool,
    prompts: Mutex<Vec<String>>,
    reloads: AtomicUsize,
}

impl FakeHost {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
            reloads: AtomicUsize::new(0),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn reloads(&self) -> usize {
        self.reloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageHost for FakeHost {
    async fn confirm(&self, prompt: &str) -> bool {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer
    }

    fn reload(&self) {
        self.reloads.fetch_add(1, Ordering::SeqCst);
    }
}
