use crate::interface_adapters::handlers::local_clock;
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage};
use crate::interface_adapters::state::AppState;
use crate::interface_adapters::view::render_view;
use crate::use_cases::{KioskInput, KioskState};

use axum::{
    extract::{
        State,
        ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code},
    },
    response::IntoResponse,
};
use futures::SinkExt;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{Instrument, debug, info, info_span, warn};

// A client that keeps sending garbage is disconnected.
const MAX_INVALID_MESSAGES: u32 = 10;

#[derive(Debug)]
enum NetError {
    #[allow(dead_code)]
    Ws(axum::Error),
    #[allow(dead_code)]
    Serialization(serde_json::Error),
    InputClosed,
    StateClosed,
}

enum LoopControl {
    Continue,
    Disconnect,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let input_tx = state.input_tx.clone();
    let state_rx = state.state_rx.clone();
    ws.on_upgrade(move |socket| {
        let conn_id = uuid::Uuid::new_v4();
        handle_socket(socket, input_tx, state_rx).instrument(info_span!("conn", %conn_id))
    })
}

async fn handle_socket(
    mut socket: WebSocket,
    input_tx: mpsc::Sender<KioskInput>,
    mut state_rx: watch::Receiver<KioskState>,
) {
    info!("front end connected");

    // Mark the current value seen so `changed` only fires on new states.
    let initial = state_rx.borrow_and_update().clone();
    if let Err(err) = send_view(&mut socket, &initial).await {
        warn!(error = ?err, "failed to send initial view");
        return;
    }

    let mut invalid = 0u32;
    let result = loop {
        let control = tokio::select! {
            incoming = socket.recv() => {
                handle_incoming(&mut socket, incoming, &input_tx, &state_rx, &mut invalid).await
            }
            changed = state_rx.changed() => match changed {
                Ok(()) => {
                    let latest = state_rx.borrow_and_update().clone();
                    send_view(&mut socket, &latest).await.map(|_| LoopControl::Continue)
                }
                Err(_) => Err(NetError::StateClosed),
            },
        };

        match control {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Disconnect) => break Ok(()),
            Err(err) => break Err(err),
        }
    };

    match result {
        Ok(()) => info!("front end disconnected"),
        Err(NetError::InputClosed | NetError::StateClosed) => {
            warn!("kiosk task is gone; closing socket");
            let _ = socket
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::AWAY,
                    reason: "kiosk unavailable".into(),
                })))
                .await;
        }
        Err(err) => warn!(error = ?err, "socket loop exited with error"),
    }
    if let Err(err) = socket.close().await {
        debug!(error = ?err, "socket close error");
    }
}

async fn handle_incoming(
    socket: &mut WebSocket,
    incoming: Option<Result<Message, axum::Error>>,
    input_tx: &mpsc::Sender<KioskInput>,
    state_rx: &watch::Receiver<KioskState>,
    invalid: &mut u32,
) -> Result<LoopControl, NetError> {
    let Some(incoming) = incoming else {
        return Ok(LoopControl::Disconnect);
    };

    let text = match incoming.map_err(NetError::Ws)? {
        Message::Text(text) => text,
        Message::Close(_) => return Ok(LoopControl::Disconnect),
        Message::Ping(_) | Message::Pong(_) => return Ok(LoopControl::Continue),
        Message::Binary(_) => {
            send_error(socket, "binary messages not supported").await?;
            return Ok(LoopControl::Continue);
        }
    };

    let parsed = serde_json::from_str::<ClientMessage>(&text)
        .map_err(|err| err.to_string())
        .and_then(|message| {
            let snapshot = state_rx.borrow();
            message.into_input(&snapshot).map_err(|err| err.to_string())
        });

    match parsed {
        Ok(input) => {
            input_tx
                .send(input)
                .await
                .map_err(|_| NetError::InputClosed)?;
            Ok(LoopControl::Continue)
        }
        Err(reason) => {
            *invalid += 1;
            debug!(%reason, count = *invalid, "invalid client message");
            if *invalid >= MAX_INVALID_MESSAGES {
                let _ = socket
                    .send(Message::Close(Some(CloseFrame {
                        code: close_code::POLICY,
                        reason: "too many invalid messages".into(),
                    })))
                    .await;
                return Ok(LoopControl::Disconnect);
            }
            send_error(socket, &reason).await?;
            Ok(LoopControl::Continue)
        }
    }
}

async fn send_view(socket: &mut WebSocket, state: &KioskState) -> Result<(), NetError> {
    let message = ServerMessage::View(render_view(state, local_clock()));
    send_message(socket, &message).await
}

async fn send_error(socket: &mut WebSocket, message: &str) -> Result<(), NetError> {
    let message = ServerMessage::Error {
        message: message.to_string(),
    };
    send_message(socket, &message).await
}

async fn send_message(socket: &mut WebSocket, message: &ServerMessage) -> Result<(), NetError> {
    let txt = serde_json::to_string(message).map_err(NetError::Serialization)?;
    socket
        .send(Message::Text(txt.into()))
        .await
        .map_err(NetError::Ws)
}
