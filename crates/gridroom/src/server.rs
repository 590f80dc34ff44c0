//! `GridroomServer` builder and server loop.
//!
//! This is the entry point for running a Gridroom server. It ties
//! together all the layers: transport → protocol → room.

use std::sync::Arc;

use gridroom_protocol::{Codec, JsonCodec};
use gridroom_room::{RoomConfig, RoomStore};
use gridroom_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::GridroomError;
use crate::gateway::handle_connection;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The store
/// mutex is held only for map operations, never across a room call.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: Mutex<RoomStore>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Gridroom server.
///
/// # Example
///
/// ```rust,ignore
/// use gridroom::GridroomServer;
///
/// let server = GridroomServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct GridroomServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
}

impl GridroomServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            room_config: RoomConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the per-room configuration.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Builds the server, binding the listener.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`, which is what the
    /// browser client speaks.
    pub async fn build(self) -> Result<GridroomServer<JsonCodec>, GridroomError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            rooms: Mutex::new(RoomStore::new(self.room_config)),
            codec: JsonCodec,
        });

        Ok(GridroomServer { transport, state })
    }
}

impl Default for GridroomServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Gridroom server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct GridroomServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> GridroomServer<C> {
    /// Creates a new builder.
    pub fn builder() -> GridroomServerBuilder {
        GridroomServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a gateway task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), GridroomError> {
        tracing::info!("Gridroom server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
