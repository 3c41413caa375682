//! A WebSocket backend for the alloy pubsub service that ends the session with a normal closure.

use std::{sync::Arc, time::Duration};

use alloy::{
    pubsub::{ConnectionHandle, ConnectionInterface, PubSubConnect},
    rpc::json_rpc::PubSubItem,
    transports::{TransportErrorKind, TransportResult},
};
use futures::{SinkExt, StreamExt};
use tokio::{net::TcpStream, sync::Notify};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream,
    tungstenite::{
        Message,
        protocol::{CloseFrame, frame::coding::CloseCode},
    },
};
use tracing::{debug, warn};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long the peer gets to acknowledge the close frame before the socket is dropped.
const CLOSE_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connects to a WebSocket endpoint for the alloy pubsub service.
///
/// Once the service shuts the backend down, which happens when the last client using it is
/// dropped, the backend sends a close frame with the normal closure code, waits for the peer to
/// acknowledge it, and then signals [`NormalClosureWs::closed`].
#[derive(Clone, Debug)]
pub struct NormalClosureWs {
    url: String,
    closed: Arc<Notify>,
}

impl NormalClosureWs {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            closed: Arc::new(Notify::new()),
        }
    }

    /// Notified once a backend finished closing its socket.
    pub fn closed(&self) -> Arc<Notify> {
        self.closed.clone()
    }
}

impl PubSubConnect for NormalClosureWs {
    fn is_local(&self) -> bool {
        alloy::transports::utils::guess_local_url(&self.url)
    }

    async fn connect(&self) -> TransportResult<ConnectionHandle> {
        let (socket, _) = tokio_tungstenite::connect_async(self.url.as_str())
            .await
            .map_err(TransportErrorKind::custom)?;

        let (handle, interface) = ConnectionHandle::new();
        tokio::spawn(run_backend(socket, interface, self.closed.clone()));

        Ok(handle)
    }
}

async fn run_backend(mut socket: Socket, mut interface: ConnectionInterface, closed: Arc<Notify>) {
    let errored = loop {
        tokio::select! {
            biased;
            request = interface.recv_from_frontend() => {
                let Some(request) = request else {
                    break false;
                };
                let message = Message::Text(request.get().to_owned().into());
                if let Err(error) = socket.send(message).await {
                    warn!(%error, "Failed to send a request to the node");
                    break true;
                }
            }
            message = socket.next() => match message {
                Some(Ok(Message::Text(text))) => {
                    match serde_json::from_str::<PubSubItem>(text.as_str()) {
                        Ok(item) => {
                            if interface.send_to_frontend(item).is_err() {
                                break false;
                            }
                        }
                        Err(error) => {
                            warn!(%error, "Node sent a malformed message");
                            break true;
                        }
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    warn!(?frame, "Node closed the connection");
                    break true;
                }
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    warn!(%error, "Connection to the node failed");
                    break true;
                }
                None => {
                    warn!("Node went away");
                    break true;
                }
            }
        }
    };

    if errored {
        interface.close_with_error();
    } else {
        close_normally(&mut socket).await;
    }
    closed.notify_one();
}

async fn close_normally(socket: &mut Socket) {
    let frame = CloseFrame {
        code: CloseCode::Normal,
        reason: "".into(),
    };
    if let Err(error) = socket.close(Some(frame)).await {
        debug!(%error, "Failed to send the close frame");
        return;
    }

    // The handshake is done once the peer echoes the close frame and the stream ends.
    let drained = tokio::time::timeout(CLOSE_HANDSHAKE_TIMEOUT, async {
        while let Some(Ok(_)) = socket.next().await {}
    })
    .await;
    if drained.is_err() {
        debug!("Node did not acknowledge the close frame in time");
    }
}
