//! The run channel seam and its WebSocket implementation.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use reqwest::Url;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("websocket: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("{0}")]
    Other(String),
}

/// Opens run channels to the remote engine.
#[async_trait]
pub trait RunConnector: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn RunChannel>, ChannelError>;
}

/// An open run channel carrying text frames.
#[async_trait]
pub trait RunChannel: Send {
    async fn send_text(&mut self, text: String) -> Result<(), ChannelError>;

    /// Next text frame; `None` once the channel has closed.
    async fn next_text(&mut self) -> Option<Result<String, ChannelError>>;

    /// Client-side close.
    async fn close(&mut self);
}

// ---------------------------------------------------------------------------
// WebSocket
// ---------------------------------------------------------------------------

pub struct WsConnector {
    url: Url,
}

impl WsConnector {
    pub fn new(url: Url) -> Self {
        Self { url }
    }
}

#[async_trait]
impl RunConnector for WsConnector {
    async fn connect(&self) -> Result<Box<dyn RunChannel>, ChannelError> {
        debug!(url = %self.url, "opening run channel");
        let (stream, _response) = connect_async(self.url.as_str()).await?;
        Ok(Box::new(WsChannel { stream }))
    }
}

struct WsChannel {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl RunChannel for WsChannel {
    async fn send_text(&mut self, text: String) -> Result<(), ChannelError> {
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn next_text(&mut self) -> Option<Result<String, ChannelError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text)),
                Ok(Message::Binary(bytes)) => {
                    return Some(Ok(String::from_utf8_lossy(&bytes).into_owned()))
                }
                Ok(Message::Close(_)) => return None,
                Ok(_) => continue,
                // The engine ends a run by dropping the socket without a close
                // handshake; that is its normal end of stream.
                Err(tungstenite::Error::ConnectionClosed)
                | Err(tungstenite::Error::AlreadyClosed)
                | Err(tungstenite::Error::Protocol(
                    tungstenite::error::ProtocolError::ResetWithoutClosingHandshake,
                )) => return None,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) {
        if let Err(e) = self.stream.close(None).await {
            debug!(error = %e, "run channel close failed");
        }
    }
}

#[derive(Debug, Error)]
pub enum RunUrlError {
    #[error("invalid run path {path}: {reason}")]
    Join { path: String, reason: String },

    #[error("unsupported scheme for run channel: {0}")]
    Scheme(String),
}

/// Derive the run endpoint from the HTTP base URL: `http -> ws`, `https -> wss`.
pub fn run_url(base: &Url, run_path: &str) -> Result<Url, RunUrlError> {
    let mut url = base.join(run_path).map_err(|e| RunUrlError::Join {
        path: run_path.to_string(),
        reason: e.to_string(),
    })?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(RunUrlError::Scheme(other.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|_| RunUrlError::Scheme(scheme.to_string()))?;
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_url_from_http_base() {
        let base = Url::parse("http://127.0.0.1:8080").unwrap();
        assert_eq!(run_url(&base, "/ws/run").unwrap().as_str(), "ws://127.0.0.1:8080/ws/run");
    }

    #[test]
    fn test_run_url_from_https_base() {
        let base = Url::parse("https://picker.example/ui/").unwrap();
        assert_eq!(
            run_url(&base, "/ws/run").unwrap().as_str(),
            "wss://picker.example/ws/run"
        );
    }

    #[tokio::test]
    async fn test_wss_is_supported() {
        // Plain TCP peer: the TLS handshake fails, but TLS itself is available.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                drop(stream);
            }
        });

        let base = Url::parse(&format!("https://{}", addr)).unwrap();
        let connector = WsConnector::new(run_url(&base, "/ws/run").unwrap());
        match connector.connect().await {
            Ok(_) => panic!("plain TCP peer accepted a TLS handshake"),
            Err(ChannelError::WebSocket(tungstenite::Error::Url(
                tungstenite::error::UrlError::TlsFeatureNotEnabled,
            ))) => panic!("built without TLS support"),
            Err(_) => {}
        }
    }

    #[test]
    fn test_run_url_rejects_other_schemes() {
        let base = Url::parse("ftp://example.com").unwrap();
        assert!(run_url(&base, "/ws/run").is_err());
    }
}
