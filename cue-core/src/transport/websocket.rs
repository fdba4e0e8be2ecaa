//! WebSocket command transport.
//!
//! One submitted command is one text message. Inbound frames are only
//! watched for closure; their content is logged and otherwise ignored.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info};

use crate::channel::LinkEvents;
use crate::error::CueError;
use crate::transport::{Connector, Link};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens WebSocket connections to a fixed endpoint.
#[derive(Debug, Clone)]
pub struct WsConnector {
    url: String,
}

impl WsConnector {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, events: LinkEvents) -> Result<Box<dyn Link>, CueError> {
        info!(url = %self.url, attempt = events.attempt(), "connecting websocket");
        let (stream, _response) = connect_async(self.url.as_str()).await?;
        let (sink, source) = stream.split();
        tokio::spawn(watch_inbound(source, events));
        Ok(Box::new(WsLink { sink }))
    }
}

/// Reads until the peer goes away, then reports the closure once.
async fn watch_inbound(mut source: SplitStream<WsStream>, events: LinkEvents) {
    let reason = loop {
        let frame = tokio::select! {
            _ = events.cancelled() => return,
            frame = source.next() => frame,
        };
        match frame {
            Some(Ok(Message::Close(frame))) => {
                debug!(?frame, "close frame received");
                break None;
            }
            Some(Ok(Message::Text(text))) => debug!(%text, "inbound message ignored"),
            Some(Ok(_)) => {}
            Some(Err(e)) => break Some(CueError::from(e)),
            None => break None,
        }
    };
    events.closed(reason);
}

struct WsLink {
    sink: SplitSink<WsStream, Message>,
}

#[async_trait]
impl Link for WsLink {
    async fn send(&mut self, command: &str) -> Result<(), CueError> {
        self.sink.send(Message::text(command)).await?;
        Ok(())
    }

    async fn close(&mut self) {
        let _ = self.sink.close().await;
    }
}
