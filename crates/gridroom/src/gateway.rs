//! Per-connection gateway: decode requests, route them to rooms, and
//! relay room events back out on the socket.
//!
//! Each accepted connection gets its own Tokio task running
//! [`handle_connection`]. Outbound events take a detour through an
//! unbounded channel drained by a dedicated writer task, so a room can
//! push events while the gateway is parked in `recv()`, and everything
//! reaches the socket through a single writer in order.

use std::sync::Arc;

use gridroom_protocol::{ClientRequest, Codec, RoomId, ServerEvent};
use gridroom_room::{RoomError, RoomHandle};
use gridroom_transport::{Connection, ConnectionId, WebSocketConnection};
use tokio::sync::mpsc;

use crate::GridroomError;
use crate::server::ServerState;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), GridroomError>
where
    C: Codec,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    // Single ordered writer: rooms and the gateway itself push events
    // into this channel, the writer task serializes them onto the socket.
    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<ServerEvent>();
    let writer = {
        let conn = conn.clone();
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                let bytes = match state.codec.encode(&event) {
                    Ok(bytes) => bytes,
                    Err(e) => {
                        tracing::error!(%conn_id, error = %e, "encode failed");
                        continue;
                    }
                };
                if let Err(e) = conn.send(&bytes).await {
                    tracing::debug!(%conn_id, error = %e, "send failed, writer exiting");
                    break;
                }
            }
        })
    };

    // The room this connection is seated in, if any. A connection is in
    // at most one room for its whole lifetime.
    let mut membership: Option<RoomId> = None;

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let request: ClientRequest = match state.codec.decode(&data) {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode request");
                let _ = events_tx.send(ServerEvent::MalformedRequest {
                    reason: e.to_string(),
                });
                continue;
            }
        };

        handle_request(&state, conn_id, &events_tx, &mut membership, request)
            .await;
    }

    // Unbind the seat; the room stays alive for a reconnect and is
    // removed once both seats are vacant.
    if let Some(room_id) = membership {
        state.rooms.lock().await.disconnect(&room_id, conn_id).await;
    }

    // Dropping the last event sender ends the writer task.
    drop(events_tx);
    let _ = writer.await;
    Ok(())
}

/// Dispatches one decoded request.
///
/// Room lookups hold the store lock only for the map operation; the
/// room call itself runs against the cloned handle.
async fn handle_request<C>(
    state: &Arc<ServerState<C>>,
    conn_id: ConnectionId,
    events_tx: &mpsc::UnboundedSender<ServerEvent>,
    membership: &mut Option<RoomId>,
    request: ClientRequest,
) where
    C: Codec,
{
    match request {
        ClientRequest::CreateRoom {
            room_id,
            display_name,
        } => {
            if membership.is_some() {
                let _ = events_tx.send(ServerEvent::MalformedRequest {
                    reason: "connection is already in a room".into(),
                });
                return;
            }
            let result = state.rooms.lock().await.create(
                room_id.clone(),
                display_name,
                conn_id,
                events_tx.clone(),
            );
            match result {
                Ok(_) => *membership = Some(room_id),
                Err(RoomError::AlreadyExists(room_id)) => {
                    tracing::debug!(%conn_id, %room_id, "room id taken");
                    let _ = events_tx.send(ServerEvent::RoomExists);
                }
                Err(e) => {
                    tracing::warn!(%conn_id, error = %e, "create failed");
                }
            }
        }

        ClientRequest::JoinRoom {
            room_id,
            display_name,
        } => {
            if membership.is_some() {
                let _ = events_tx.send(ServerEvent::MalformedRequest {
                    reason: "connection is already in a room".into(),
                });
                return;
            }
            let Some(handle) = lookup(state, &room_id, events_tx).await else {
                return;
            };
            match handle.join(conn_id, display_name, events_tx.clone()).await {
                Ok(()) => *membership = Some(room_id),
                Err(RoomError::RoomFull(room_id)) => {
                    tracing::debug!(%conn_id, %room_id, "join rejected, room full");
                    let _ = events_tx.send(ServerEvent::RoomFull);
                }
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "join failed");
                    let _ = events_tx.send(ServerEvent::RoomNotFound);
                }
            }
        }

        ClientRequest::ReconnectToRoom {
            room_id,
            display_name,
        } => {
            if membership.is_some() {
                let _ = events_tx.send(ServerEvent::MalformedRequest {
                    reason: "connection is already in a room".into(),
                });
                return;
            }
            let Some(handle) = lookup(state, &room_id, events_tx).await else {
                return;
            };
            match handle
                .reconnect(conn_id, display_name, events_tx.clone())
                .await
            {
                Ok(()) => *membership = Some(room_id),
                Err(RoomError::RoomFull(room_id)) => {
                    tracing::debug!(%conn_id, %room_id, "reconnect rejected, room full");
                    let _ = events_tx.send(ServerEvent::RoomFull);
                }
                Err(e) => {
                    tracing::debug!(%conn_id, error = %e, "reconnect failed");
                    let _ = events_tx.send(ServerEvent::RoomNotFound);
                }
            }
        }

        ClientRequest::MakeMove {
            room_id,
            cell_index,
        } => {
            // A move into a missing room is dropped without an event;
            // the room actor handles every in-room rejection itself.
            let handle = state.rooms.lock().await.get(&room_id);
            if let Some(handle) = handle {
                let _ = handle.make_move(conn_id, cell_index).await;
            }
        }

        ClientRequest::ContinueGame { room_id } => {
            let handle = state.rooms.lock().await.get(&room_id);
            if let Some(handle) = handle {
                let _ = handle.continue_game(conn_id).await;
            }
        }

        ClientRequest::SendMessage {
            room_id,
            author,
            text,
        } => {
            let handle = state.rooms.lock().await.get(&room_id);
            if let Some(handle) = handle {
                let _ = handle.chat(conn_id, author, text).await;
            }
        }
    }
}

/// Looks up a room, reporting `roomNotFound` to the connection when the
/// id is unknown.
async fn lookup<C>(
    state: &Arc<ServerState<C>>,
    room_id: &RoomId,
    events_tx: &mpsc::UnboundedSender<ServerEvent>,
) -> Option<RoomHandle>
where
    C: Codec,
{
    match state.rooms.lock().await.lookup(room_id) {
        Ok(handle) => Some(handle),
        Err(e) => {
            tracing::debug!(error = %e, "lookup failed");
            let _ = events_tx.send(ServerEvent::RoomNotFound);
            None
        }
    }
}
