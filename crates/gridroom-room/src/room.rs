//! Room actor: an isolated Tokio task that owns one game.
//!
//! Each room runs in its own task and communicates with the outside world
//! through an mpsc command channel — no shared mutable state. Because the
//! actor processes one command at a time, moves, reconnects, and
//! disconnects on the same room never interleave, and events reach the
//! seats in the same order as the mutations that produced them.

use gridroom_protocol::{
    Board, ChatMessage, EMPTY_BOARD, Mark, RoomId, ServerEvent,
};
use gridroom_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};

use crate::{RoomConfig, RoomError, rules};

/// Channel sender for delivering events to one seat's connection.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its channel.
///
/// Operations with a result carry a oneshot reply channel; the rest are
/// fire-and-forget and surface failures as events to the acting seat.
pub(crate) enum RoomCommand {
    /// Claim a free seat under a display name.
    Join {
        conn: ConnectionId,
        name: String,
        sender: EventSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Rebind the seat owned by `name` to a new connection.
    Reconnect {
        conn: ConnectionId,
        name: String,
        sender: EventSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Place the acting seat's mark at `index`.
    Move { conn: ConnectionId, index: usize },

    /// Manual reset: clear the board, keep the turn.
    Continue { conn: ConnectionId },

    /// Append a chat message and relay it to both seats.
    Chat {
        conn: ConnectionId,
        author: String,
        text: String,
    },

    /// Unbind a seat's connection. The reply reports whether both seats
    /// are now vacant (the room should be dropped).
    Disconnect {
        conn: ConnectionId,
        reply: oneshot::Sender<bool>,
    },

    /// Request a metadata snapshot.
    GetInfo { reply: oneshot::Sender<RoomInfo> },

    /// Deferred post-win reset fired by the timer task. Ignored unless
    /// `epoch` still matches the room's current game instance.
    ResetDue { epoch: u64 },
}

/// A snapshot of room state for the store and tests.
#[derive(Debug, Clone)]
pub struct RoomInfo {
    /// The room's id.
    pub room_id: RoomId,
    /// Current board contents.
    pub board: Board,
    /// Whose move is legal next.
    pub turn: Mark,
    /// Seats with a live connection.
    pub bound: usize,
    /// Seats with a recorded owner name (bound or vacant).
    pub claimed: usize,
    /// Current game-instance counter.
    pub epoch: u64,
}

/// Handle to a running room actor. Cheap to clone — it wraps an
/// `mpsc::Sender`. The [`RoomStore`](crate::RoomStore) holds one per room.
#[derive(Clone, Debug)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's id.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Sends a join request and waits for the outcome.
    pub async fn join(
        &self,
        conn: ConnectionId,
        name: String,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                conn,
                name,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?
    }

    /// Sends a reconnect request and waits for the outcome.
    pub async fn reconnect(
        &self,
        conn: ConnectionId,
        name: String,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Reconnect {
                conn,
                name,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?
    }

    /// Sends a move (fire-and-forget; rejections come back as
    /// `invalidMove` events on the seat's channel).
    pub async fn make_move(
        &self,
        conn: ConnectionId,
        index: usize,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Move { conn, index })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Sends a manual reset request (fire-and-forget).
    pub async fn continue_game(
        &self,
        conn: ConnectionId,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Continue { conn })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Sends a chat message (fire-and-forget).
    pub async fn chat(
        &self,
        conn: ConnectionId,
        author: String,
        text: String,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Chat { conn, author, text })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Unbinds a connection from its seat. Returns `true` when both seats
    /// are now vacant and the room is shutting down.
    pub async fn disconnect(
        &self,
        conn: ConnectionId,
    ) -> Result<bool, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Disconnect {
                conn,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }

    /// Requests a state snapshot.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::GetInfo { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id.clone()))
    }
}

/// One of the two fixed player slots. Seat 0 plays X, seat 1 plays O.
///
/// `owner` is the stable identity: once a name claims a seat it is never
/// reassigned while the room exists. `conn` and `sender` are the current
/// binding and are cleared on disconnect ("claimed but vacant").
struct Seat {
    owner: Option<String>,
    conn: Option<ConnectionId>,
    sender: Option<EventSender>,
}

impl Seat {
    fn vacant() -> Self {
        Self {
            owner: None,
            conn: None,
            sender: None,
        }
    }

    fn bound(name: String, conn: ConnectionId, sender: EventSender) -> Self {
        Self {
            owner: Some(name),
            conn: Some(conn),
            sender: Some(sender),
        }
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    room_id: RoomId,
    config: RoomConfig,
    board: Board,
    turn: Mark,
    seats: [Seat; 2],
    chat_log: Vec<ChatMessage>,
    /// Game-instance counter; bumped on every reset so stale deferred
    /// reset timers can be recognized and dropped.
    epoch: u64,
    receiver: mpsc::Receiver<RoomCommand>,
    /// Weak handle to our own command channel, used to schedule deferred
    /// resets without keeping the actor alive on our own account.
    own_sender: mpsc::WeakSender<RoomCommand>,
}

impl RoomActor {
    /// Runs the actor loop until both seats are vacant or every handle
    /// is dropped.
    async fn run(mut self) {
        tracing::info!(room_id = %self.room_id, "room actor started");

        // The creator is already bound to seat 0: tell them their role
        // and that X moves first.
        self.send_to(0, ServerEvent::PlayerRole { mark: Mark::X });
        self.send_to(0, ServerEvent::YourTurn { active: true });

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    conn,
                    name,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(conn, name, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Reconnect {
                    conn,
                    name,
                    sender,
                    reply,
                } => {
                    let result = self.handle_reconnect(conn, name, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Move { conn, index } => {
                    self.handle_move(conn, index);
                }
                RoomCommand::Continue { conn } => {
                    self.handle_continue(conn);
                }
                RoomCommand::Chat { conn, author, text } => {
                    self.handle_chat(conn, author, text);
                }
                RoomCommand::Disconnect { conn, reply } => {
                    let vacant = self.handle_disconnect(conn);
                    let _ = reply.send(vacant);
                    if vacant {
                        tracing::info!(
                            room_id = %self.room_id,
                            "both seats vacant, room closing"
                        );
                        break;
                    }
                }
                RoomCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                RoomCommand::ResetDue { epoch } => {
                    self.handle_reset_due(epoch);
                }
            }
        }

        tracing::info!(room_id = %self.room_id, "room actor stopped");
    }

    fn handle_join(
        &mut self,
        conn: ConnectionId,
        name: String,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        let Some(idx) = self.seats.iter().position(|s| s.owner.is_none())
        else {
            return Err(RoomError::RoomFull(self.room_id.clone()));
        };

        self.seats[idx] = Seat::bound(name.clone(), conn, sender);
        tracing::info!(
            room_id = %self.room_id,
            %conn,
            name,
            seat = idx,
            "player joined"
        );

        self.send_to(idx, ServerEvent::PlayerRole {
            mark: Mark::for_seat(idx),
        });
        self.broadcast(ServerEvent::GameState { board: self.board });
        self.send_turn_notifications();
        Ok(())
    }

    fn handle_reconnect(
        &mut self,
        conn: ConnectionId,
        name: String,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        // Name-based identity: the connection id changed across the
        // reconnect, the display name didn't.
        let idx = match self
            .seats
            .iter()
            .position(|s| s.owner.as_deref() == Some(name.as_str()))
        {
            Some(idx) => idx,
            // Unknown name: a free seat makes this a fresh join.
            None => match self.seats.iter().position(|s| s.owner.is_none()) {
                Some(idx) => {
                    self.seats[idx].owner = Some(name.clone());
                    idx
                }
                None => return Err(RoomError::RoomFull(self.room_id.clone())),
            },
        };

        self.seats[idx].conn = Some(conn);
        self.seats[idx].sender = Some(sender);
        let role = Mark::for_seat(idx);
        tracing::info!(
            room_id = %self.room_id,
            %conn,
            name,
            seat = idx,
            "player reconnected"
        );

        self.send_to(idx, ServerEvent::Reconnected {
            room_id: self.room_id.clone(),
            role,
            is_your_turn: self.turn == role,
            board: self.board,
            chat_log: self.chat_log.clone(),
        });
        self.send_to(1 - idx, ServerEvent::OpponentReconnected);
        Ok(())
    }

    fn handle_move(&mut self, conn: ConnectionId, index: usize) {
        // Unknown connection: not an occupant, silently ignore.
        let Some(idx) = self.seat_of(conn) else {
            tracing::debug!(room_id = %self.room_id, %conn, "move from non-member");
            return;
        };
        let mark = Mark::for_seat(idx);

        let reason = if index >= self.board.len() {
            Some("cell index out of range")
        } else if rules::winner(&self.board).is_some() {
            Some("game is already decided")
        } else if self.turn != mark {
            Some("not your turn")
        } else if self.board[index].is_some() {
            Some("cell is occupied")
        } else {
            None
        };
        if let Some(reason) = reason {
            tracing::debug!(room_id = %self.room_id, %conn, index, reason, "move rejected");
            self.send_to(idx, ServerEvent::InvalidMove {
                reason: reason.to_string(),
            });
            return;
        }

        self.board[index] = Some(mark);
        self.turn = mark.opponent();
        tracing::debug!(room_id = %self.room_id, %mark, index, "move accepted");
        self.broadcast(ServerEvent::GameState { board: self.board });

        if let Some(winner) = rules::winner(&self.board) {
            tracing::info!(room_id = %self.room_id, %winner, "game decided");
            self.broadcast(ServerEvent::Winner { mark: Some(winner) });
            self.schedule_reset();
        } else if rules::is_full(&self.board) {
            tracing::info!(room_id = %self.room_id, "game drawn");
            self.broadcast(ServerEvent::Draw);
        } else {
            self.send_turn_notifications();
        }
    }

    /// Schedules the post-win board reset. The timer task holds a strong
    /// sender only for the duration of the sleep; a stale epoch or a
    /// closed channel makes the firing a no-op.
    fn schedule_reset(&self) {
        let Some(sender) = self.own_sender.upgrade() else {
            return;
        };
        let epoch = self.epoch;
        let delay = self.config.reset_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = sender.send(RoomCommand::ResetDue { epoch }).await;
        });
    }

    fn handle_reset_due(&mut self, epoch: u64) {
        if epoch != self.epoch {
            tracing::debug!(
                room_id = %self.room_id,
                stale = epoch,
                current = self.epoch,
                "dropping stale reset timer"
            );
            return;
        }
        let Some(winner) = rules::winner(&self.board) else {
            return;
        };
        // The loser opens the next game.
        self.turn = winner.opponent();
        self.reset_board();
    }

    fn handle_continue(&mut self, conn: ConnectionId) {
        // Only occupants may restart the game.
        if self.seat_of(conn).is_none() {
            tracing::debug!(room_id = %self.room_id, %conn, "continue from non-member");
            return;
        }
        self.reset_board();
    }

    /// Clears the board for the next game, keeping `turn` as currently
    /// set, and resyncs both seats. Bumping the epoch invalidates any
    /// pending deferred reset.
    fn reset_board(&mut self) {
        self.board = EMPTY_BOARD;
        self.epoch += 1;
        tracing::info!(room_id = %self.room_id, epoch = self.epoch, "board reset");
        self.broadcast(ServerEvent::GameState { board: self.board });
        self.broadcast(ServerEvent::Winner { mark: None });
        self.send_turn_notifications();
    }

    fn handle_chat(&mut self, conn: ConnectionId, author: String, text: String) {
        // Only occupants may post; the author string itself is relayed
        // as supplied.
        if self.seat_of(conn).is_none() {
            tracing::debug!(room_id = %self.room_id, %conn, "chat from non-member");
            return;
        }
        let message = ChatMessage {
            author: author.clone(),
            text: text.clone(),
        };
        self.chat_log.push(message);
        self.broadcast(ServerEvent::NewMessage { author, text });
    }

    fn handle_disconnect(&mut self, conn: ConnectionId) -> bool {
        // A connection superseded by a reconnect no longer matches any
        // seat; its late disconnect must not unbind the new connection.
        let Some(idx) = self.seat_of(conn) else {
            return false;
        };
        self.seats[idx].conn = None;
        self.seats[idx].sender = None;
        tracing::info!(
            room_id = %self.room_id,
            %conn,
            seat = idx,
            "player disconnected, seat stays claimed"
        );

        let vacant = self.seats.iter().all(|s| s.conn.is_none());
        if !vacant {
            let other = 1 - idx;
            self.send_to(other, ServerEvent::OpponentDisconnected);
            self.send_to(other, ServerEvent::YourTurn {
                active: self.turn == Mark::for_seat(other),
            });
        }
        vacant
    }

    /// The seat index currently bound to `conn`, if any.
    fn seat_of(&self, conn: ConnectionId) -> Option<usize> {
        self.seats.iter().position(|s| s.conn == Some(conn))
    }

    /// Sends an event to one seat. Silently drops if the seat is vacant
    /// or its receiver is gone.
    fn send_to(&self, idx: usize, event: ServerEvent) {
        if let Some(sender) = &self.seats[idx].sender {
            let _ = sender.send(event);
        }
    }

    /// Sends an event to both bound seats.
    fn broadcast(&self, event: ServerEvent) {
        self.send_to(0, event.clone());
        self.send_to(1, event);
    }

    /// Tells each bound seat whether it is their turn.
    fn send_turn_notifications(&self) {
        for idx in 0..2 {
            self.send_to(idx, ServerEvent::YourTurn {
                active: self.turn == Mark::for_seat(idx),
            });
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id.clone(),
            board: self.board,
            turn: self.turn,
            bound: self.seats.iter().filter(|s| s.conn.is_some()).count(),
            claimed: self.seats.iter().filter(|s| s.owner.is_some()).count(),
            epoch: self.epoch,
        }
    }
}

/// Spawns a new room actor with the creator bound to seat 0 (mark X)
/// and returns a handle to communicate with it.
pub(crate) fn spawn_room(
    room_id: RoomId,
    config: RoomConfig,
    creator_name: String,
    creator_conn: ConnectionId,
    creator_sender: EventSender,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size);

    let actor = RoomActor {
        room_id: room_id.clone(),
        config,
        board: EMPTY_BOARD,
        turn: Mark::X,
        seats: [
            Seat::bound(creator_name, creator_conn, creator_sender),
            Seat::vacant(),
        ],
        chat_log: Vec::new(),
        epoch: 0,
        receiver: rx,
        own_sender: tx.downgrade(),
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_id,
        sender: tx,
    }
}
