use super::transport::{Connector, Frame, FrameSource, TransportError};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, Message},
};
use tracing::debug;
use url::Url;

/// Production connector over tokio-tungstenite.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, endpoint: &Url) -> Result<Box<dyn FrameSource>, TransportError> {
        let (stream, response) = connect_async(endpoint.as_str())
            .await
            .map_err(|err| TransportError::Connect(err.to_string()))?;
        debug!(status = %response.status(), "websocket handshake complete");
        Ok(Box::new(WsFrameSource { stream }))
    }
}

struct WsFrameSource {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl FrameSource for WsFrameSource {
    async fn next_frame(&mut self) -> Option<Result<Frame, TransportError>> {
        loop {
            let message = match self.stream.next().await? {
                Ok(message) => message,
                Err(tungstenite::Error::ConnectionClosed) => return None,
                Err(tungstenite::Error::Protocol(err)) => {
                    return Some(Err(TransportError::Protocol(err.to_string())));
                }
                Err(err) => return Some(Err(TransportError::Receive(err.to_string()))),
            };

            let frame = match message {
                Message::Text(text) => Frame::Text(text.as_str().to_owned()),
                Message::Binary(bytes) => Frame::Binary(bytes.to_vec()),
                Message::Close(reason) => {
                    debug!(?reason, "close frame received");
                    Frame::Close
                }
                // Pongs are queued by tungstenite itself.
                Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => continue,
            };
            return Some(Ok(frame));
        }
    }

    async fn close(&mut self) {
        if let Err(err) = self.stream.close(None).await {
            debug!(error = %err, "websocket close failed");
        }
    }
}
