//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket message protocol between the browser client and the
//! API server for the study-buddy chat.

use serde::{Deserialize, Serialize};

//=========================================================================================
// Messages Sent FROM the Client (Browser) TO the Server
//=========================================================================================

/// Represents the structured text messages a client can send to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// One chat turn. The client disables its send control while a turn is
    /// outstanding; the server additionally processes turns strictly one at
    /// a time.
    Send { text: String },
}

//=========================================================================================
// Messages Sent FROM the Server TO the Client (Browser)
//=========================================================================================

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// One incremental fragment of the model's reply, to be appended to the
    /// message currently being rendered.
    Fragment { text: String },

    /// Signals that the current turn has settled (successfully or not) and a
    /// new message may be sent.
    TurnComplete,

    /// Reports a failed turn. Any fragments already delivered stay on screen;
    /// the client renders `message` as a separate chat bubble.
    Error { message: String },
}
