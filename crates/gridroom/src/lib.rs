//! # Gridroom
//!
//! Room-based realtime sync server for two-player tic-tac-toe.
//!
//! The server is authoritative: clients send requests (create, join,
//! move, chat), rooms validate them and push the resulting state to
//! both seats over WebSocket. Seats are identified by display name, so
//! a dropped player can reconnect and resume mid-game.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use gridroom::GridroomServer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gridroom::GridroomError> {
//!     let server = GridroomServer::<gridroom::protocol::JsonCodec>::builder()
//!         .bind("127.0.0.1:8080")
//!         .build()
//!         .await?;
//!     server.run().await
//! }
//! ```

mod error;
mod gateway;
mod server;

pub use error::GridroomError;
pub use server::{GridroomServer, GridroomServerBuilder};

pub use gridroom_protocol as protocol;
pub use gridroom_room as room;
pub use gridroom_transport as transport;
