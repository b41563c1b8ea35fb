use crate::error::{Result, SyncError};
use crate::models::{
    ActionResponse, ExportFormat, StopResponse, TaskStartRequest, TrackingStatus,
};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Remote operations of the time-tracking server.
#[async_trait]
pub trait TimelogApi: Send + Sync {
    async fn current_status(&self) -> Result<TrackingStatus>;

    async fn start_task(&self, request: &TaskStartRequest) -> Result<ActionResponse>;

    async fn stop_task(&self) -> Result<StopResponse>;

    async fn stats_data(&self, days: u32) -> Result<Value>;

    async fn clear_data(&self) -> Result<ActionResponse>;

    async fn export_data(&self, format: ExportFormat) -> Result<Vec<u8>>;
}

/// `TimelogApi` over HTTP/JSON.
///
/// No request timeout is configured; calls run until the transport gives up.
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| SyncError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status(status.as_u16()));
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> Result<T> {
        let body = self.send(request).await?.text().await?;
        serde_json::from_str(&body).map_err(|e| SyncError::Parse(e.to_string()))
    }
}

#[async_trait]
impl TimelogApi for HttpApi {
    async fn current_status(&self) -> Result<TrackingStatus> {
        self.send_json(self.client.get(self.url("/api/current_status")))
            .await
    }

    async fn start_task(&self, request: &TaskStartRequest) -> Result<ActionResponse> {
        tracing::debug!("POST /api/start_task: {:?}", request);
        self.send_json(self.client.post(self.url("/api/start_task")).json(request))
            .await
    }

    async fn stop_task(&self) -> Result<StopResponse> {
        self.send_json(self.client.post(self.url("/api/stop_task")))
            .await
    }

    async fn stats_data(&self, days: u32) -> Result<Value> {
        let request = self
            .client
            .get(self.url("/api/stats_data"))
            .query(&[("days", days)]);
        self.send_json(request).await
    }

    async fn clear_data(&self) -> Result<ActionResponse> {
        self.send_json(self.client.post(self.url("/api/clear_data")))
            .await
    }

    async fn export_data(&self, format: ExportFormat) -> Result<Vec<u8>> {
        let request = self
            .client
            .get(self.url("/api/export_data"))
            .query(&[("format", format.as_str())]);
        let bytes = self.send(request).await?.bytes().await?;
        Ok(bytes.to_vec())
    }
}
