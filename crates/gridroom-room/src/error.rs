//! Error types for the room layer.

use gridroom_protocol::RoomId;

/// Errors that can occur during room operations.
///
/// These are all recoverable: the gateway reports each one to the
/// originating connection as a named event and keeps the connection open.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist.
    #[error("room {0} not found")]
    NotFound(RoomId),

    /// A room with this id already exists.
    #[error("room {0} already exists")]
    AlreadyExists(RoomId),

    /// Both seats are occupied or claimed.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The room's command channel is closed (actor has stopped).
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
