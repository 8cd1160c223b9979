use axum::extract::ws::{WebSocketUpgrade, WebSocket, Message};
use axum::extract::State;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::adapters::http::state::HttpState;
use crate::domain::stream::WsFrameMetaMessage;

pub async fn ws_handler(ws: WebSocketUpgrade, State(st): State<HttpState>) -> impl axum::response::IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, st))
}

/// Texto JSON con las detecciones de cada frame y binario con el frame anotado.
async fn handle_socket(mut socket: WebSocket, st: HttpState) {
    let mut detections = st.detections.subscribe();
    let mut frames = st.frames.subscribe();

    loop {
        let msg = tokio::select! {
            meta = detections.recv() => match meta {
                Ok(meta) => {
                    let json = serde_json::to_string(&WsFrameMetaMessage { r#type: "detections".into(), meta })
                        .unwrap_or_default();
                    Message::Text(json.into())
                }
                Err(RecvError::Lagged(n)) => {
                    debug!("Cliente WS atrasado, {} mensajes descartados", n);
                    continue;
                }
                Err(RecvError::Closed) => break,
            },
            jpeg = frames.recv() => match jpeg {
                Ok(jpeg) => Message::Binary(jpeg.into()),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            },
        };

        if socket.send(msg).await.is_err() { break; }
    }
}
