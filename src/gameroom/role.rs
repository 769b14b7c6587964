use serde::Serialize;
use serde::Serializer;

/// Partnership a seat plays for. Teammates sit on opposite boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Team {
    A,
    B,
}

/// One of the two linked boards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Board {
    One,
    Two,
}

/// Side to move on a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

/// Fixed (team, board, color) assignment handed out by join order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Role {
    pub team: Team,
    pub board: Board,
    pub color: Color,
}

/// Role table indexed by join order.
pub const ROLES: [Role; crate::SEATS] = [
    Role::new(Team::A, Board::One, Color::White),
    Role::new(Team::B, Board::One, Color::Black),
    Role::new(Team::A, Board::Two, Color::Black),
    Role::new(Team::B, Board::Two, Color::White),
];

impl Role {
    pub const fn new(team: Team, board: Board, color: Color) -> Self {
        Self { team, board, color }
    }
    /// Role for the nth joiner, if the room has one left.
    pub fn nth(n: usize) -> Option<Self> {
        ROLES.get(n).copied()
    }
    pub fn is_teammate(&self, other: &Self) -> bool {
        self.team == other.team && self != other
    }
}

impl Board {
    pub const ALL: [Board; crate::BOARDS] = [Board::One, Board::Two];
    pub fn index(&self) -> usize {
        match self {
            Board::One => 0,
            Board::Two => 1,
        }
    }
    /// Parses a wire board id. Browsers send it as a string, so
    /// `"1"` is accepted as readily as `1`.
    pub fn parse(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
                .and_then(|n| Self::try_from(n).ok()),
            serde_json::Value::String(s) => s.trim().parse::<u64>().ok().and_then(|n| Self::try_from(n).ok()),
            _ => None,
        }
    }
}

impl TryFrom<u64> for Board {
    type Error = u64;
    fn try_from(n: u64) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(Board::One),
            2 => Ok(Board::Two),
            n => Err(n),
        }
    }
}

impl From<Board> for u8 {
    fn from(board: Board) -> Self {
        match board {
            Board::One => 1,
            Board::Two => 2,
        }
    }
}

impl Serialize for Board {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(u8::from(*self))
    }
}

impl Color {
    pub fn flip(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Team::A => write!(f, "A"),
            Team::B => write!(f, "B"),
        }
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.team, self.board, self.color)
    }
}
