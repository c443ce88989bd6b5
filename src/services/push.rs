use crate::{error::Result, models::push::PushEvent};
use async_trait::async_trait;

/// 推送通道：建立到服务端的长连接
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// 握手时携带 Bearer 令牌
    async fn connect(&self, token: &str) -> Result<Box<dyn PushConnection>>;
}

/// 一条已建立的推送连接
#[async_trait]
pub trait PushConnection: Send {
    /// 加入用户专属房间
    async fn join(&mut self, user_id: &str) -> Result<()>;

    /// 下一条事件；连接断开时返回 None
    async fn next_event(&mut self) -> Option<Result<PushEvent>>;

    async fn close(&mut self);
}

#[cfg(feature = "websocket")]
pub use self::websocket::WebSocketTransport;

#[cfg(feature = "websocket")]
mod websocket {
    use super::{PushConnection, PushTransport};
    use crate::{
        error::{AppError, Result},
        models::push::{PushEvent, PushFrame},
    };
    use async_trait::async_trait;
    use futures::{SinkExt, StreamExt};
    use tokio::net::TcpStream;
    use tokio_tungstenite::{
        connect_async,
        tungstenite::{
            client::IntoClientRequest,
            http::{header::AUTHORIZATION, HeaderValue},
            Message,
        },
        MaybeTlsStream, WebSocketStream,
    };
    use tracing::{debug, info, warn};

    /// 基于 WebSocket 的推送通道，帧格式为 `{ "event", "data" }` 的JSON文本
    #[derive(Debug, Clone)]
    pub struct WebSocketTransport {
        url: String,
    }

    impl WebSocketTransport {
        pub fn new(url: impl Into<String>) -> Self {
            Self { url: url.into() }
        }
    }

    #[async_trait]
    impl PushTransport for WebSocketTransport {
        async fn connect(&self, token: &str) -> Result<Box<dyn PushConnection>> {
            let mut request = self.url.as_str().into_client_request()?;
            let auth = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| AppError::WebSocket(format!("Invalid token header: {}", e)))?;
            request.headers_mut().insert(AUTHORIZATION, auth);

            debug!("Connecting push channel to {}", self.url);
            let (stream, _) = connect_async(request).await?;
            info!("Push channel connected to {}", self.url);

            Ok(Box::new(WebSocketConnection { stream }))
        }
    }

    struct WebSocketConnection {
        stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    }

    #[async_trait]
    impl PushConnection for WebSocketConnection {
        async fn join(&mut self, user_id: &str) -> Result<()> {
            let frame = serde_json::to_string(&PushFrame::join(user_id))?;
            self.stream.send(Message::Text(frame)).await?;
            Ok(())
        }

        async fn next_event(&mut self) -> Option<Result<PushEvent>> {
            while let Some(message) = self.stream.next().await {
                match message {
                    Ok(Message::Text(text)) => {
                        let event = serde_json::from_str::<PushFrame>(&text)
                            .and_then(PushFrame::into_event)
                            .map_err(AppError::from);
                        return Some(event);
                    }
                    Ok(Message::Close(frame)) => {
                        debug!("Push channel closed by server: {:?}", frame);
                        return None;
                    }
                    Ok(_) => continue,
                    Err(e) => {
                        warn!("Push channel read error: {}", e);
                        return None;
                    }
                }
            }
            None
        }

        async fn close(&mut self) {
            if let Err(e) = self.stream.close(None).await {
                debug!("Error while closing push channel: {}", e);
            }
        }
    }
}
