/// Failures surfaced by the status agent and its API client.
///
/// Validation variants never reach the server. `Remote` carries the message the
/// server returned alongside `success: false`. The remaining variants cover the
/// transport: the server was unreachable, answered with a non-2xx status, or
/// sent a body that did not parse.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("task name must not be empty")]
    EmptyTaskName,

    #[error("cancelled by user")]
    Cancelled,

    #[error("server rejected request: {0}")]
    Remote(String),

    #[error("HTTP error! status: {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("status agent is not running")]
    AgentGone,
}

impl SyncError {
    /// True for failures caught before any request was sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyTaskName | Self::Cancelled)
    }
}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            Self::Status(status.as_u16())
        } else if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_status() {
        assert_eq!(SyncError::Status(502).to_string(), "HTTP error! status: 502");
    }

    #[test]
    fn display_remote() {
        let err = SyncError::Remote("没有正在进行的任务".into());
        assert_eq!(err.to_string(), "server rejected request: 没有正在进行的任务");
    }

    #[test]
    fn validation_classification() {
        assert!(SyncError::EmptyTaskName.is_validation());
        assert!(SyncError::Cancelled.is_validation());
        assert!(!SyncError::Status(500).is_validation());
        assert!(!SyncError::Remote("x".into()).is_validation());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SyncError>();
    }
}
