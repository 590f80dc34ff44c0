//! Standalone Gridroom server binary.
//!
//! Configuration comes from the environment:
//!
//! - `GRIDROOM_ADDR` — bind address (default `127.0.0.1:8080`)
//! - `GRIDROOM_RESET_DELAY_MS` — post-win reset delay (default 5000)
//! - `RUST_LOG` — log filter (default `info`)

use std::time::Duration;

use gridroom::{GridroomError, GridroomServer};
use gridroom_room::RoomConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), GridroomError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("GRIDROOM_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    let mut room_config = RoomConfig::default();
    if let Ok(ms) = std::env::var("GRIDROOM_RESET_DELAY_MS") {
        match ms.parse::<u64>() {
            Ok(ms) => room_config.reset_delay = Duration::from_millis(ms),
            Err(_) => {
                tracing::warn!(value = %ms, "ignoring invalid GRIDROOM_RESET_DELAY_MS")
            }
        }
    }

    let server = GridroomServer::<gridroom::protocol::JsonCodec>::builder()
        .bind(&addr)
        .room_config(room_config)
        .build()
        .await?;

    tracing::info!(%addr, "gridroom listening");
    server.run().await
}
