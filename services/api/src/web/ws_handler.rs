//! services/api/src/web/ws_handler.rs
//!
//! The WebSocket endpoint for the study-buddy chat. Each connection owns its
//! own transcript; turns are processed strictly one at a time by consuming
//! the fragment stream inline before the next client message is read.

use crate::web::{
    protocol::{ClientMessage, ServerMessage},
    state::AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::StreamExt;
use std::sync::Arc;
use study_vision_core::{build_context, chat::FALLBACK_MESSAGE, ChatTranscript};
use tracing::{error, info, warn};

/// The handler for upgrading HTTP requests to WebSocket connections.
pub async fn ws_handler(ws: WebSocketUpgrade, State(app_state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, app_state))
}

async fn handle_socket(mut socket: WebSocket, app_state: Arc<AppState>) {
    info!("New chat connection established.");
    let mut transcript = ChatTranscript::new();

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Send { text }) => {
                    chat_turn(&mut socket, &app_state, &mut transcript, &text).await;
                }
                Err(e) => {
                    warn!("Failed to deserialize client message: {}", e);
                }
            },
            Message::Close(_) => {
                info!("Client sent close message.");
                break;
            }
            _ => {}
        }
    }
    info!("Chat connection closed.");
}

/// Runs one chat turn end to end: grounding context, provider stream,
/// transcript updates, client forwarding. Fragments are applied in arrival
/// order; a failure leaves prior messages intact and appends the fixed
/// fallback.
async fn chat_turn(
    socket: &mut WebSocket,
    app_state: &Arc<AppState>,
    transcript: &mut ChatTranscript,
    user_text: &str,
) {
    // Recomputed from the current session on every send; never persisted.
    let grounding = {
        let controller = app_state.controller.lock().await;
        build_context(controller.current_session().map(|s| &s.data))
    };

    let history = transcript.begin_turn(user_text);
    let stream = app_state
        .chat_adapter
        .stream_reply(&history, user_text, &grounding)
        .await;

    let failed = match stream {
        Ok(mut fragments) => {
            let mut failed = false;
            while let Some(item) = fragments.next().await {
                match item {
                    Ok(fragment) => {
                        transcript.apply_fragment(&fragment);
                        if !send(socket, &ServerMessage::Fragment { text: fragment }).await {
                            return;
                        }
                    }
                    Err(e) => {
                        error!("Chat stream failed mid-turn: {}", e);
                        failed = true;
                        break;
                    }
                }
            }
            failed
        }
        Err(e) => {
            error!("Failed to start chat turn: {}", e);
            true
        }
    };

    if failed {
        transcript.fail_turn();
        if !send(
            socket,
            &ServerMessage::Error {
                message: FALLBACK_MESSAGE.to_string(),
            },
        )
        .await
        {
            return;
        }
    }
    send(socket, &ServerMessage::TurnComplete).await;
}

/// Sends one protocol message, reporting whether the connection is still up.
async fn send(socket: &mut WebSocket, message: &ServerMessage) -> bool {
    let json = serde_json::to_string(message).unwrap();
    if socket.send(Message::Text(json.into())).await.is_err() {
        warn!("Client disconnected mid-turn.");
        false
    } else {
        true
    }
}
