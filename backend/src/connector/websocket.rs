// Outbound websocket to the scoreboard's game event stream.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use machine_core::settings::ScoreboardEndpoint;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use super::ConnectorError;

type EventStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct Session {
    cancel: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl Session {
    async fn stop(self) {
        let _ = self.cancel.send(());
        let _ = self.handle.await;
    }
}

pub struct WebsocketLink {
    endpoint: Arc<RwLock<ScoreboardEndpoint>>,
    session: Mutex<Option<Session>>,
}

impl WebsocketLink {
    pub fn new(endpoint: Arc<RwLock<ScoreboardEndpoint>>) -> Self {
        Self {
            endpoint,
            session: Mutex::new(None),
        }
    }

    /// Tears down the running stream, then connects with the current endpoint.
    pub async fn reload(&self) -> Result<(), ConnectorError> {
        let mut session = self.session.lock().await;
        if let Some(active) = session.take() {
            active.stop().await;
            debug!("websocket session stopped");
        }

        let url = websocket_url(&*self.endpoint.read().await);
        let (stream, _) = connect_async(url.as_str()).await?;
        info!(%url, "websocket connected");

        let (cancel, cancel_rx) = oneshot::channel();
        let handle = tokio::spawn(read_loop(stream, cancel_rx));
        *session = Some(Session { cancel, handle });
        Ok(())
    }

    pub async fn close(&self) {
        if let Some(active) = self.session.lock().await.take() {
            active.stop().await;
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|session| !session.handle.is_finished())
            .unwrap_or(false)
    }
}

pub fn websocket_url(endpoint: &ScoreboardEndpoint) -> String {
    format!("{}/ws/{}", endpoint.ws_base(), endpoint.game_id)
}

async fn read_loop(mut stream: EventStream, mut cancel: oneshot::Receiver<()>) {
    loop {
        tokio::select! {
            _ = &mut cancel => {
                let _ = stream.close(None).await;
                break;
            }
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        debug!(len = text.len(), "scoreboard event");
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if stream.send(Message::Pong(payload)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => break,
                    Some(Ok(_)) => {}
                    Some(Err(err)) => {
                        warn!(?err, "websocket error");
                        break;
                    }
                    None => break,
                }
            }
        }
    }
    info!("websocket disconnected");
}
