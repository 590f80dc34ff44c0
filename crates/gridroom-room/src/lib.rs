//! Room lifecycle management for Gridroom.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns the
//! authoritative game state: board, turn, seat assignments, and chat log.
//! All mutations flow through the room's command channel, so operations on
//! the same room never interleave.
//!
//! # Key types
//!
//! - [`RoomStore`] — process-wide registry of rooms keyed by [`RoomId`]
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`RoomConfig`] — room settings (post-win reset delay, channel size)
//! - [`rules`] — pure win/draw evaluation over the board
//!
//! [`RoomId`]: gridroom_protocol::RoomId

mod config;
mod error;
mod room;
pub mod rules;
mod store;

pub use config::RoomConfig;
pub use error::RoomError;
pub use room::{EventSender, RoomHandle, RoomInfo};
pub use store::RoomStore;
