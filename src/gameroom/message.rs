use super::*;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// Messages sent from server to client over WebSocket.
/// Every frame is a flat JSON record discriminated by `type`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Role handed to a joiner (joiner only).
    Assignment {
        team: Team,
        board: Board,
        color: Color,
    },
    /// Rejection of the sender's last frame (sender only).
    Error { message: String },
    /// Seat count after a join.
    PlayerJoined { player_count: usize },
    /// Fourth seat claimed.
    GameStart,
    /// Side to move on a board.
    TurnUpdate { board: Board, next_turn: Color },
    /// Piece captured by a teammate, now droppable.
    AddToBank { piece: Value },
    /// A client record relayed verbatim with `sender_role` attached.
    #[serde(skip)]
    Echo(Map<String, Value>),
}

pub const NOT_YOUR_TURN: &str = "Not your turn or invalid move!";
pub const ROOM_FULL: &str = "Room is full!";
pub const ALREADY_JOINED: &str = "Already joined a room!";
pub const MALFORMED: &str = "Malformed message";

impl ServerMessage {
    pub fn assignment(role: Role) -> Self {
        Self::Assignment {
            team: role.team,
            board: role.board,
            color: role.color,
        }
    }
    pub fn error(message: &str) -> Self {
        Self::Error {
            message: message.to_string(),
        }
    }
    pub fn player_joined(player_count: usize) -> Self {
        Self::PlayerJoined { player_count }
    }
    pub fn game_start() -> Self {
        Self::GameStart
    }
    pub fn turn_update(board: Board, next_turn: Color) -> Self {
        Self::TurnUpdate { board, next_turn }
    }
    pub fn add_to_bank(piece: Value) -> Self {
        Self::AddToBank { piece }
    }
    pub fn echo(mut payload: Map<String, Value>, role: Role) -> Self {
        payload.insert(
            "sender_role".to_string(),
            serde_json::json!({ "team": role.team, "board": role.board, "color": role.color }),
        );
        Self::Echo(payload)
    }
    pub fn to_json(&self) -> String {
        match self {
            Self::Echo(payload) => Value::Object(payload.clone()).to_string(),
            message => serde_json::to_string(message).expect("serialize server message"),
        }
    }
}

impl From<RoomError> for ServerMessage {
    fn from(error: RoomError) -> Self {
        Self::error(error.reply())
    }
}
