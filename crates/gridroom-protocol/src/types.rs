//! Core protocol types for Gridroom's wire format.
//!
//! Every request and event is a single JSON object with a `"type"` tag,
//! camelCase field names, and no envelope — the WebSocket framing already
//! gives us one message per frame, in order.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Marks and the board
// ---------------------------------------------------------------------------

/// The symbol a seat plays. Seat 0 is always X, seat 1 is always O.
///
/// Serializes as a bare string (`"X"` / `"O"`), which is also how marks
/// appear inside the board array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// The mark of the opposing seat.
    pub fn opponent(self) -> Mark {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// The mark played by a seat index (0 = X, 1 = O).
    pub fn for_seat(index: usize) -> Mark {
        if index == 0 { Mark::X } else { Mark::O }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

/// One cell of the board: empty or occupied by a mark.
///
/// `Option<Mark>` gives the wire form directly — `null`, `"X"`, or `"O"`.
pub type Cell = Option<Mark>;

/// The full board: exactly 9 cells, row-major.
///
/// On the wire this is a fixed 9-element array, e.g.
/// `[null, "X", null, null, "O", null, null, null, null]`.
pub type Board = [Cell; 9];

/// A board with all cells empty.
pub const EMPTY_BOARD: Board = [None; 9];

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A room identifier: an opaque string chosen by the room's creator.
///
/// `#[serde(transparent)]` makes it serialize as the bare string, so
/// `RoomId("r1")` is just `"r1"` in JSON.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        RoomId(s.to_string())
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        RoomId(s)
    }
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// One entry in a room's chat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Display name the sender supplied.
    pub author: String,
    /// Message body, relayed verbatim.
    pub text: String,
}

// ---------------------------------------------------------------------------
// ClientRequest — connection → server
// ---------------------------------------------------------------------------

/// A request from a client connection.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON:
/// `{ "type": "createRoom", "roomId": "r1", "displayName": "Alice" }`.
/// The camelCase tags and field names match what the browser client sends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientRequest {
    /// Create a new room and take seat X.
    #[serde(rename_all = "camelCase")]
    CreateRoom { room_id: RoomId, display_name: String },

    /// Join an existing room as seat O.
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_id: RoomId, display_name: String },

    /// Resume a seat in an existing room after a dropped connection.
    /// The display name is the reconnection identity — connection ids
    /// change across reconnects, names don't.
    #[serde(rename_all = "camelCase")]
    ReconnectToRoom { room_id: RoomId, display_name: String },

    /// Place the caller's mark at `cell_index` (0–8, row-major).
    #[serde(rename_all = "camelCase")]
    MakeMove { room_id: RoomId, cell_index: usize },

    /// Manually clear the board and start the next game.
    #[serde(rename_all = "camelCase")]
    ContinueGame { room_id: RoomId },

    /// Append a chat message and relay it to both seats.
    #[serde(rename_all = "camelCase")]
    SendMessage {
        room_id: RoomId,
        author: String,
        text: String,
    },
}

// ---------------------------------------------------------------------------
// ServerEvent — server → connection
// ---------------------------------------------------------------------------

/// An event pushed to one or both connections of a room.
///
/// Same tagging scheme as [`ClientRequest`]. Unit variants serialize as
/// just the tag: `{ "type": "roomFull" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Which mark the receiving connection plays.
    PlayerRole { mark: Mark },

    /// Whether it is the receiving connection's turn to move.
    YourTurn { active: bool },

    /// Authoritative board snapshot after a mutation.
    GameState { board: Board },

    /// A game was decided (`Some`) or a reset cleared the banner (`None`).
    Winner { mark: Option<Mark> },

    /// The board filled with no winner.
    Draw,

    /// A chat message, relayed to both seats.
    NewMessage { author: String, text: String },

    /// The named room does not exist.
    RoomNotFound,

    /// Both seats are occupied or claimed.
    RoomFull,

    /// A room with the requested id already exists.
    RoomExists,

    /// The move was rejected; the board is unchanged.
    InvalidMove { reason: String },

    /// Full state resync after a successful reconnect.
    #[serde(rename_all = "camelCase")]
    Reconnected {
        room_id: RoomId,
        role: Mark,
        is_your_turn: bool,
        board: Board,
        chat_log: Vec<ChatMessage>,
    },

    /// The other seat's player came back.
    OpponentReconnected,

    /// The other seat's player dropped; their seat stays claimed.
    OpponentDisconnected,

    /// The request could not be decoded or was missing fields.
    MalformedRequest { reason: String },
}

// =========================================================================
// Tests
// =========================================================================
