use crate::messages::PageEvent;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::broadcast;

/// Watches whether the server socket is reachable and publishes transitions.
///
/// Starts out assuming the network is up, so only a real drop publishes
/// `Offline`, and only a recovery after that publishes `Online`.
pub struct ConnectivityMonitor {
    address: String,
    period: Duration,
    events: broadcast::Sender<PageEvent>,
}

impl ConnectivityMonitor {
    pub fn new(address: String, period: Duration, events: broadcast::Sender<PageEvent>) -> Self {
        Self {
            address,
            period,
            events,
        }
    }

    async fn is_reachable(&self) -> bool {
        match tokio::time::timeout(self.period, TcpStream::connect(&self.address)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                tracing::debug!("Connectivity check to {} failed: {}", self.address, e);
                false
            }
            Err(_) => {
                tracing::debug!("Connectivity check to {} timed out", self.address);
                false
            }
        }
    }

    pub async fn run(self) {
        let mut online = true;
        let mut ticker = tokio::time::interval(self.period);
        // The first tick would check before the agent's own startup poll
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let reachable = self.is_reachable().await;
            if reachable == online {
                continue;
            }

            online = reachable;
            let event = if online {
                PageEvent::Online
            } else {
                PageEvent::Offline
            };
            tracing::debug!("Connectivity changed: {:?}", event);

            // Between sessions nobody is subscribed; the next session polls at startup anyway
            if self.events.send(event).is_err() {
                tracing::debug!("No page listeners for connectivity change");
            }
        }
    }
}

/// `host:port` for a base URL, with the scheme's default port when omitted.
pub fn socket_address(base_url: &str) -> Option<String> {
    let url = reqwest::Url::parse(base_url).ok()?;
    let host = url.host_str()?;
    let port = url.port_or_known_default()?;
    Some(format!("{}:{}", host, port))
}
