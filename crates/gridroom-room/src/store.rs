//! Registry of live rooms keyed by room id.

use std::collections::HashMap;

use gridroom_protocol::RoomId;
use gridroom_transport::ConnectionId;

use crate::room::{self, EventSender, RoomHandle};
use crate::{RoomConfig, RoomError};

/// Owns the map from [`RoomId`] to [`RoomHandle`] and spawns room actors.
///
/// The store itself is not synchronized; the server wraps it in a mutex
/// and holds the lock only for map operations, never across a room call.
pub struct RoomStore {
    rooms: HashMap<RoomId, RoomHandle>,
    config: RoomConfig,
}

impl RoomStore {
    /// Creates an empty store with the given per-room configuration.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
        }
    }

    /// Spawns a new room with the creator bound to the X seat.
    ///
    /// Fails with [`RoomError::AlreadyExists`] when the id is taken.
    pub fn create(
        &mut self,
        room_id: RoomId,
        creator_name: String,
        creator_conn: ConnectionId,
        creator_sender: EventSender,
    ) -> Result<RoomHandle, RoomError> {
        if self.rooms.contains_key(&room_id) {
            return Err(RoomError::AlreadyExists(room_id));
        }
        let handle = room::spawn_room(
            room_id.clone(),
            self.config.clone(),
            creator_name,
            creator_conn,
            creator_sender,
        );
        self.rooms.insert(room_id, handle.clone());
        tracing::info!(room_id = %handle.room_id(), total = self.rooms.len(), "room created");
        Ok(handle)
    }

    /// Returns a handle to the room, if it exists.
    pub fn get(&self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms.get(room_id).cloned()
    }

    /// Like [`get`](Self::get), but reports an unknown id as
    /// [`RoomError::NotFound`].
    pub fn lookup(&self, room_id: &RoomId) -> Result<RoomHandle, RoomError> {
        self.rooms
            .get(room_id)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    /// Returns `true` if a room with this id exists.
    pub fn contains(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Unbinds a connection from its seat in the room and removes the
    /// room once both seats are vacant. Returns `true` if the room was
    /// removed.
    pub async fn disconnect(
        &mut self,
        room_id: &RoomId,
        conn: ConnectionId,
    ) -> bool {
        let Some(handle) = self.rooms.get(room_id) else {
            return false;
        };
        // An Err means the actor already stopped; drop the entry either way.
        let vacant = handle.disconnect(conn).await.unwrap_or(true);
        if vacant {
            self.rooms.remove(room_id);
            tracing::info!(%room_id, total = self.rooms.len(), "room removed");
        }
        vacant
    }

    /// Removes a room unconditionally, stopping its actor once every
    /// outstanding handle is dropped.
    pub fn delete(&mut self, room_id: &RoomId) -> Option<RoomHandle> {
        self.rooms.remove(room_id)
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Returns `true` if no rooms exist.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Ids of all live rooms, in arbitrary order.
    pub fn ids(&self) -> Vec<RoomId> {
        self.rooms.keys().cloned().collect()
    }
}

impl Default for RoomStore {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
