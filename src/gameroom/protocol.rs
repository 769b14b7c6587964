use super::*;
use serde_json::Map;
use serde_json::Value;

/// Errors that can occur while decoding a client frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ProtocolError {
    /// Not a JSON object.
    Malformed(String),
    /// Object without a usable `type` field.
    UnknownType(String),
    /// Known `type` missing a required field.
    MissingField(&'static str),
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(s) => write!(f, "malformed frame: {}", s),
            Self::UnknownType(s) => write!(f, "unknown message type: {}", s),
            Self::MissingField(s) => write!(f, "missing field: {}", s),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// A move or drop as submitted. Everything beyond the board and the
/// captured piece is opaque and relayed untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Play {
    kind: PlayKind,
    board: Option<Board>,
    captured: Option<Value>,
    payload: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayKind {
    Move,
    Drop,
}

impl Play {
    fn new(kind: PlayKind, payload: Map<String, Value>) -> Self {
        let board = payload.get("board").and_then(Board::parse);
        let captured = match kind {
            PlayKind::Move => payload.get("captured_piece").filter(|v| !v.is_null()).cloned(),
            PlayKind::Drop => None,
        };
        Self {
            kind,
            board,
            captured,
            payload,
        }
    }
    pub fn kind(&self) -> PlayKind {
        self.kind
    }
    /// Target board, or None if the client named something that is not a board.
    pub fn board(&self) -> Option<Board> {
        self.board
    }
    /// Piece taken by a move. Drops never capture.
    pub fn captured(&self) -> Option<&Value> {
        self.captured.as_ref()
    }
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }
    pub fn into_payload(self) -> Map<String, Value> {
        self.payload
    }
}

/// Messages received from client over WebSocket.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    Join { room: String },
    Play(Play),
    Chat(Map<String, Value>),
}

/// Parses client frames into typed messages.
pub struct Protocol;

impl Protocol {
    /// Parses a client text frame.
    pub fn decode(s: &str) -> Result<ClientMessage, ProtocolError> {
        let payload = match serde_json::from_str::<Value>(s) {
            Ok(Value::Object(map)) => map,
            Ok(other) => return Err(ProtocolError::Malformed(other.to_string())),
            Err(e) => return Err(ProtocolError::Malformed(e.to_string())),
        };
        let kind = payload
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| ProtocolError::UnknownType("<none>".to_string()))?;
        match kind.as_str() {
            "join" => payload
                .get("room")
                .and_then(Value::as_str)
                .map(|room| ClientMessage::Join {
                    room: room.to_string(),
                })
                .ok_or(ProtocolError::MissingField("room")),
            "move" => Ok(ClientMessage::Play(Play::new(PlayKind::Move, payload))),
            "drop" => Ok(ClientMessage::Play(Play::new(PlayKind::Drop, payload))),
            "chat" => Ok(ClientMessage::Chat(payload)),
            _ => Err(ProtocolError::UnknownType(kind)),
        }
    }
}
