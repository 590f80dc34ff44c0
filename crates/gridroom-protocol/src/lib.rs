//! Wire protocol for Gridroom.
//!
//! This crate defines the language that clients and the server speak:
//!
//! - **Types** ([`ClientRequest`], [`ServerEvent`], [`Mark`], [`Board`],
//!   [`RoomId`], [`ChatMessage`]) — the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to and from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while encoding or
//!   decoding.
//!
//! The protocol layer sits between transport (raw bytes) and the room
//! layer (game state). It knows nothing about connections or rooms — only
//! how to serialize and deserialize messages.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    Board, Cell, ChatMessage, ClientRequest, Mark, RoomId, ServerEvent,
    EMPTY_BOARD,
};
