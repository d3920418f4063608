//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::{
    domain::{MessageContent, ParticipantId, RequestOutcome, ThoughtText},
    infrastructure::dto::websocket::ClientEvent,
    ui::state::AppState,
    usecase::{ConnectError, RequestChatError, SendMessageError},
};

/// Query parameters for WebSocket connection
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    pub client_id: String,
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let client_id_str = query.client_id;

    // Convert String -> ParticipantId (Domain Model)
    let client_id = match ParticipantId::try_from(client_id_str.clone()) {
        Ok(id) => id,
        Err(_) => {
            tracing::warn!("Invalid client_id format: '{}'", client_id_str);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    // Create a channel for this client to receive messages
    let (tx, rx) = mpsc::unbounded_channel();

    let client_id_for_handle = client_id.clone();
    match state
        .connect_participant_usecase
        .execute(client_id, tx)
        .await
    {
        Ok(_connected_at) => {
            tracing::info!("Client '{}' connected and registered", client_id_str);
            Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, client_id_for_handle, rx)))
        }
        Err(ConnectError::DuplicateParticipantId(_)) => {
            tracing::warn!(
                "Client with ID '{}' is already connected. Rejecting connection.",
                client_id_str
            );
            Err(StatusCode::CONFLICT)
        }
        Err(ConnectError::LobbyFull) => {
            tracing::warn!("Lobby is full. Cannot add participant '{}'", client_id_str);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Spawns a task that receives messages from the rx channel and pushes them
/// to the WebSocket sender.
///
/// This handles the outbound flow: pushes addressed to this client (status
/// broadcasts, candidate deltas, chat events) are drained from the channel
/// and written to this client's socket.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    client_id: ParticipantId,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (sender, mut receiver) = socket.split();

    // Spawn a task to push queued outbound messages to this client
    let mut send_task = pusher_loop(rx, sender);

    let state_clone = state.clone();
    let client_id_clone = client_id.clone();

    // Spawn a task to receive events from this client
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    // Malformed payloads are rejected at this boundary and
                    // never reach core state
                    let event = match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::warn!(
                                "Malformed payload from '{}': {} ({})",
                                client_id_clone,
                                e,
                                text
                            );
                            continue;
                        }
                    };
                    dispatch_event(&state_clone, &client_id_clone, event).await;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                Message::Close(_) => {
                    tracing::info!("Client '{}' requested close", client_id_clone);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Unwind everything this participant was involved in
    state
        .disconnect_participant_usecase
        .execute(client_id)
        .await;
}

/// Dispatch a parsed client event to the matching use case.
///
/// Events claiming a sender identity other than the connection's own
/// client_id are dropped: participant ids are self-asserted but a connection
/// may only speak for the id it registered with.
async fn dispatch_event(state: &AppState, client_id: &ParticipantId, event: ClientEvent) {
    match event {
        ClientEvent::ChatRequest {
            from_user_id,
            to_user_id,
            thought_text,
        } => {
            let Some(from) = parse_own_id(client_id, &from_user_id) else {
                return;
            };
            let (Ok(to), Ok(thought_text)) = (
                ParticipantId::try_from(to_user_id),
                ThoughtText::try_from(thought_text),
            ) else {
                tracing::warn!("Invalid chatRequest payload from '{}'", client_id);
                return;
            };

            if let Err(e) = state
                .request_chat_usecase
                .execute(from, to, thought_text)
                .await
            {
                match &e {
                    RequestChatError::Lobby(_) => {
                        tracing::info!("Chat request by '{}' rejected: {}", client_id, e);
                        // The requester learns the target is busy from a
                        // fresh status snapshot
                        state.chat_status_usecase.push_to(client_id).await;
                    }
                    other => {
                        tracing::warn!("Chat request by '{}' failed: {}", client_id, other);
                    }
                }
            }
        }
        ClientEvent::AcceptChat {
            from_user_id,
            to_user_id,
        } => {
            // The acceptor is `to`; `from` names the original requester
            let Some(to) = parse_own_id(client_id, &to_user_id) else {
                return;
            };
            let Ok(from) = ParticipantId::try_from(from_user_id) else {
                tracing::warn!("Invalid acceptChat payload from '{}'", client_id);
                return;
            };

            if let Err(e) = state.accept_chat_usecase.execute(&from, &to).await {
                if e.is_request_not_found() {
                    tracing::info!(
                        "Accept by '{}' ignored: request already resolved",
                        client_id
                    );
                } else {
                    tracing::info!("Accept by '{}' rejected: {}", client_id, e);
                    state.chat_status_usecase.push_to(client_id).await;
                }
            }
        }
        ClientEvent::DeclineChat {
            from_user_id,
            to_user_id,
        } => {
            let Some(to) = parse_own_id(client_id, &to_user_id) else {
                return;
            };
            let Ok(from) = ParticipantId::try_from(from_user_id) else {
                tracing::warn!("Invalid declineChat payload from '{}'", client_id);
                return;
            };

            state
                .resolve_request_usecase
                .execute(&from, &to, RequestOutcome::Declined)
                .await;
        }
        ClientEvent::CloseChat {
            from_user_id,
            to_user_id,
        } => {
            let Some(from) = parse_own_id(client_id, &from_user_id) else {
                return;
            };
            let Ok(to) = ParticipantId::try_from(to_user_id) else {
                tracing::warn!("Invalid closeChat payload from '{}'", client_id);
                return;
            };

            state.close_chat_usecase.execute(&from, &to).await;
        }
        ClientEvent::Message {
            from_user_id,
            to_user_id,
            text,
        } => {
            let Some(from) = parse_own_id(client_id, &from_user_id) else {
                return;
            };
            let (Ok(to), Ok(content)) = (
                ParticipantId::try_from(to_user_id),
                MessageContent::try_from(text),
            ) else {
                tracing::warn!("Invalid message payload from '{}'", client_id);
                return;
            };

            match state.send_message_usecase.execute(from, to, content).await {
                Ok(()) => {}
                Err(SendMessageError::NoActiveSession { from, to }) => {
                    // Out-of-session delivery is not a supported semantic:
                    // drop silently, nothing goes back to the sender
                    tracing::debug!(
                        "Dropped out-of-session message from '{}' to '{}'",
                        from,
                        to
                    );
                }
                Err(e) => {
                    tracing::warn!("Failed to deliver message from '{}': {}", client_id, e);
                }
            }
        }
        ClientEvent::ChatStatus {} => {
            state.chat_status_usecase.push_to(client_id).await;
        }
    }
}

/// Parse an id field that must match the connection's own client_id.
fn parse_own_id(client_id: &ParticipantId, claimed: &str) -> Option<ParticipantId> {
    match ParticipantId::try_from(claimed.to_string()) {
        Ok(id) if &id == client_id => Some(id),
        Ok(id) => {
            tracing::warn!(
                "Client '{}' sent an event claiming to be '{}', dropping",
                client_id,
                id
            );
            None
        }
        Err(_) => {
            tracing::warn!("Invalid participant id in event from '{}'", client_id);
            None
        }
    }
}
