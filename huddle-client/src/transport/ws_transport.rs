use crate::error::ClientError;
use crate::transport::SignalChannel;
use futures::{SinkExt, StreamExt};
use huddle_core::{ClientMessage, ServerMessage};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

/// Opens a WebSocket to the coordination server, e.g. `ws://127.0.0.1:3000/ws`.
///
/// Two pump tasks move JSON frames between the socket and the returned
/// channel. Dropping the channel closes the socket.
pub async fn connect(url: &str) -> Result<SignalChannel, ClientError> {
    let (socket, _) = connect_async(url).await?;
    info!("Connected to signaling server at {}", url);

    let (mut sender, mut receiver) = socket.split();
    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<ClientMessage>();
    let (in_tx, in_rx) = mpsc::unbounded_channel::<ServerMessage>();

    tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize client message: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
        let _ = sender.close().await;
        debug!("Signaling writer stopped");
    });

    tokio::spawn(async move {
        while let Some(frame) = receiver.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<ServerMessage>(text.as_str()) {
                        Ok(msg) => {
                            if in_tx.send(msg).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Unparseable server frame: {}", e),
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    warn!("Signaling socket error: {}", e);
                    break;
                }
            }
        }
        debug!("Signaling reader stopped");
    });

    SignalChannel::establish(out_tx, in_rx).await
}
