//! WebSocket Endpoint for Spoken Answers
//!
//! Live capture clients stream binary audio frames during a turn and send a
//! single `end_of_turn` message when the learner stops speaking. Frames are
//! accumulated in an `AudioTurnBuffer`; only the finalized clip is handed to
//! the session controller, which transcribes and evaluates it as one
//! `submit_answer` transition.

use crate::{audio::AudioTurnBuffer, models::SessionView, state::AppState};
use anyhow::Result;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt, stream::SplitSink};
use quizdrill_core::session::AnswerInput;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Messages sent from the client (browser) to the server.
#[derive(Deserialize, Debug)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Identifies the user context. This must be the first message.
    Init { user_id: String },
    /// Declares the container format of the frames that follow
    /// (e.g. "answer.wav"). Optional; defaults to WAV.
    SetFormat { filename: String },
    /// The learner finished speaking; finalize and evaluate the turn.
    EndOfTurn,
}

/// Messages sent from the server to the client (browser).
#[derive(Serialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Confirms initialization and provides the current session contents.
    Initialized { session: SessionView },
    /// Evaluation result for the finalized turn.
    Feedback {
        feedback: String,
        reference_answer: Option<String>,
    },
    /// A recoverable error; the client may record and submit another turn.
    Error { message: String },
}

/// Axum handler to upgrade an HTTP connection to a WebSocket.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Main handler for an individual WebSocket connection.
#[instrument(name = "ws_session", skip_all, fields(user_id))]
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut socket_tx, mut socket_rx) = socket.split();

    // The first message from the client must be an `init` message.
    let user_id = match socket_rx.next().await {
        Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMessage>(&text) {
            Ok(ClientMessage::Init { user_id }) => user_id,
            _ => {
                let _ = send_msg(
                    &mut socket_tx,
                    ServerMessage::Error {
                        message: "first message must be `init`".to_string(),
                    },
                )
                .await;
                return;
            }
        },
        _ => {
            info!("Client disconnected before sending init message.");
            return;
        }
    };
    tracing::Span::current().record("user_id", user_id.as_str());
    info!("Spoken-answer session initialized.");

    let session = SessionView::from(state.controller.snapshot(&user_id));
    if send_msg(&mut socket_tx, ServerMessage::Initialized { session })
        .await
        .is_err()
    {
        return;
    }

    let mut buffer = AudioTurnBuffer::new();

    while let Some(msg_result) = socket_rx.next().await {
        let ws_msg = match msg_result {
            Ok(msg) => msg,
            Err(e) => {
                warn!("Error receiving from client WebSocket: {:?}", e);
                break;
            }
        };
        match ws_msg {
            Message::Binary(data) => buffer.push_frame(&data),
            Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::SetFormat { filename }) => buffer.set_format(filename),
                Ok(ClientMessage::EndOfTurn) => {
                    // An empty turn needs no transcription round trip; an
                    // empty candidate yields the sentinel feedback either way.
                    let input = if buffer.is_empty() {
                        AnswerInput::Text(String::new())
                    } else {
                        AnswerInput::Audio(buffer.finalize())
                    };
                    let reply = match state.controller.submit_answer(&user_id, input).await {
                        Ok(snapshot) => ServerMessage::Feedback {
                            feedback: snapshot.feedback.clone().unwrap_or_default(),
                            reference_answer: snapshot.reference_answer,
                        },
                        Err(e) => ServerMessage::Error {
                            message: e.to_string(),
                        },
                    };
                    if send_msg(&mut socket_tx, reply).await.is_err() {
                        break;
                    }
                }
                Ok(ClientMessage::Init { .. }) => {
                    warn!("Ignoring unexpected `init` message post-init.");
                }
                Err(e) => warn!("Ignoring unparseable client message: {:?}", e),
            },
            Message::Close(_) => {
                info!("Client sent close frame. Shutting down session.");
                break;
            }
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }
    info!("WebSocket connection closed.");
}

/// A helper function to serialize and send a `ServerMessage` to the client.
async fn send_msg(
    socket_tx: &mut SplitSink<WebSocket, Message>,
    msg: ServerMessage,
) -> Result<()> {
    let serialized = serde_json::to_string(&msg)?;
    socket_tx.send(Message::Text(serialized.into())).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_deserialize_from_tagged_json() {
        let init: ClientMessage = serde_json::from_str(r#"{"type":"init","user_id":"u1"}"#).unwrap();
        assert!(matches!(init, ClientMessage::Init { user_id } if user_id == "u1"));

        let end: ClientMessage = serde_json::from_str(r#"{"type":"end_of_turn"}"#).unwrap();
        assert!(matches!(end, ClientMessage::EndOfTurn));

        let format: ClientMessage =
            serde_json::from_str(r#"{"type":"set_format","filename":"answer.mp3"}"#).unwrap();
        assert!(matches!(format, ClientMessage::SetFormat { filename } if filename == "answer.mp3"));
    }

    #[test]
    fn server_feedback_serializes_with_tag() {
        let msg = ServerMessage::Feedback {
            feedback: "Correct.".to_string(),
            reference_answer: Some("Chlorophyll.".to_string()),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains(r#""type":"feedback""#));
        assert!(json.contains("Chlorophyll."));
    }
}
