//! HTTP command transport.
//!
//! Each command is the body of its own POST. Requests are independent, so
//! unlike the WebSocket channel there is no queue and no ordering between
//! commands. The response is logged and dropped.

use async_trait::async_trait;
use reqwest::Client;
use tokio::runtime::Handle;
use tokio_util::task::TaskTracker;
use tracing::{info, warn};

use crate::error::CueError;
use crate::transport::CommandSink;

/// Posts commands to a fixed control endpoint.
#[derive(Debug, Clone)]
pub struct HttpCommandSender {
    client: Client,
    url: String,
    in_flight: TaskTracker,
}

impl HttpCommandSender {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), url)
    }

    /// Create a sender with a custom `reqwest::Client`.
    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            in_flight: TaskTracker::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl CommandSink for HttpCommandSender {
    /// Spawn the POST on the current runtime and return immediately.
    ///
    /// Fails when called outside a Tokio runtime or after `close`.
    fn submit(&self, command: String) -> Result<(), CueError> {
        if self.in_flight.is_closed() {
            return Err(CueError::ChannelClosed);
        }
        let runtime = Handle::try_current().map_err(|e| CueError::Other(e.to_string()))?;

        info!(%command, url = %self.url, "sending");
        let request = self.client.post(&self.url).body(command);
        let post = async move {
            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    if status.is_success() {
                        info!(%status, %body, "command accepted");
                    } else {
                        warn!(%status, %body, "command rejected");
                    }
                }
                Err(e) => warn!("request failed: {e}"),
            }
        };
        self.in_flight.spawn_on(post, &runtime);
        Ok(())
    }

    /// Wait for every request already spawned to finish.
    async fn close(&self) {
        self.in_flight.close();
        self.in_flight.wait().await;
    }

    fn pending_count(&self) -> usize {
        self.in_flight.len()
    }
}
