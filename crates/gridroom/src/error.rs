//! Unified error type for the Gridroom server.

use gridroom_protocol::ProtocolError;
use gridroom_room::RoomError;
use gridroom_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `gridroom` meta-crate, you deal with this single
/// error type instead of importing errors from each sub-crate.
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GridroomError {
    /// A transport-level error (connection, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (full, not found, already exists).
    #[error(transparent)]
    Room(#[from] RoomError),
}
