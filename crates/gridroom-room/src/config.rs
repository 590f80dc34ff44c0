//! Room configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration shared by all rooms a [`RoomStore`] spawns.
///
/// [`RoomStore`]: crate::RoomStore
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// How long after a win before the board resets automatically.
    pub reset_delay: Duration,

    /// Command channel size for room actors. If the channel fills up,
    /// senders wait (bounded channel, backpressure).
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            reset_delay: Duration::from_secs(5),
            channel_size: 64,
        }
    }
}
