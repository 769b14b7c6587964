use super::*;
use crate::BOARDS;
use crate::Position;
use serde_json::Map;
use serde_json::Value;

/// Errors that can occur while applying a client request to a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomError {
    /// All four seats have been claimed.
    RoomFull,
    /// The connection already holds a seat.
    AlreadySeated,
    /// Wrong turn, unknown board, or unseated sender.
    InvalidAction,
    /// A send to a seated connection failed.
    DeliveryFailure,
}

impl RoomError {
    /// Text shown to the offending client.
    pub fn reply(&self) -> &'static str {
        match self {
            Self::RoomFull => ROOM_FULL,
            Self::AlreadySeated => ALREADY_JOINED,
            Self::InvalidAction => NOT_YOUR_TURN,
            Self::DeliveryFailure => "Delivery failed",
        }
    }
}

impl std::fmt::Display for RoomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RoomFull => write!(f, "room full"),
            Self::AlreadySeated => write!(f, "already seated"),
            Self::InvalidAction => write!(f, "invalid action"),
            Self::DeliveryFailure => write!(f, "delivery failure"),
        }
    }
}

impl std::error::Error for RoomError {}

/// One bughouse session: four seats over two boards.
///
/// Every operation runs to completion on `&mut self`, so wrapping the room in
/// a mutex makes validate + mutate + fan-out a single step for other callers.
#[derive(Debug)]
pub struct Room {
    id: String,
    table: Table,
    turns: [Color; BOARDS],
    closed: bool,
}

impl Room {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            table: Table::default(),
            turns: [Color::White; BOARDS],
            closed: false,
        }
    }
    pub fn id(&self) -> &str {
        &self.id
    }
    /// Side to move on a board.
    pub fn turn(&self, board: Board) -> Color {
        self.turns[board.index()]
    }
    /// Seats claimed so far. Departed players still count.
    pub fn player_count(&self) -> usize {
        self.table.claimed()
    }
    pub fn is_full(&self) -> bool {
        self.table.is_full()
    }
    /// Every claimed seat has since been vacated.
    pub fn is_abandoned(&self) -> bool {
        self.table.claimed() > 0 && self.table.occupied() == 0
    }
    pub fn role_of(&self, client: &Client) -> Option<Role> {
        self.table.position(client).and_then(Role::nth)
    }
    /// Marks the room as removed from the registry.
    pub fn close(&mut self) {
        self.closed = true;
    }
    /// Closed rooms are unreachable by id; joiners must look the id up again.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Room {
    /// Seats a client in the next free role.
    pub fn join(&mut self, client: &Client) -> Result<Role, RoomError> {
        if self.table.position(client).is_some() {
            client.reply(&ServerMessage::from(RoomError::AlreadySeated));
            return Err(RoomError::AlreadySeated);
        }
        let Some(pos) = self.table.claim(client.clone()) else {
            log::info!("[room {}] rejected {}: full", self.id, client.id());
            client.reply(&ServerMessage::from(RoomError::RoomFull));
            return Err(RoomError::RoomFull);
        };
        let role = ROLES[pos];
        log::info!("[room {}] P{} joined as {}", self.id, pos, role);
        let count = self.table.claimed();
        self.table.unicast(pos, &ServerMessage::assignment(role));
        self.table.broadcast(&ServerMessage::player_joined(count), &[]);
        if self.table.is_full() {
            self.start();
        }
        Ok(role)
    }
    /// Applies a move or drop, returning the side now to move on its board.
    pub fn submit(&mut self, client: &Client, play: Play) -> Result<Color, RoomError> {
        let Some((pos, role, board)) = self.validate(client, &play) else {
            log::debug!("[room {}] rejected {:?} from {}", self.id, play.kind(), client.id());
            client.reply(&ServerMessage::from(RoomError::InvalidAction));
            return Err(RoomError::InvalidAction);
        };
        let captured = play.captured().cloned();
        log::debug!("[room {}] P{} {:?} on board {}", self.id, pos, play.kind(), board);
        self.table
            .broadcast(&ServerMessage::echo(play.into_payload(), role), &[]);
        if let Some(piece) = captured {
            self.bank(pos, piece);
        }
        let next = self.flip(board);
        self.table
            .broadcast(&ServerMessage::turn_update(board, next), &[]);
        Ok(next)
    }
    /// Relays chat from a seated client to the whole room.
    pub fn chat(&mut self, client: &Client, payload: Map<String, Value>) -> Result<(), RoomError> {
        let Some(role) = self.role_of(client) else {
            log::debug!("[room {}] dropped chat from unseated {}", self.id, client.id());
            return Err(RoomError::InvalidAction);
        };
        self.table.broadcast(&ServerMessage::echo(payload, role), &[]);
        Ok(())
    }
    /// Vacates a departing client's seat. The role is not released.
    pub fn leave(&mut self, client: &Client) -> Option<Role> {
        let pos = self.table.position(client)?;
        self.table.vacate(pos);
        log::info!("[room {}] P{} left", self.id, pos);
        Role::nth(pos)
    }
}

impl Room {
    fn start(&mut self) {
        log::info!("[room {}] game start", self.id);
        self.table.broadcast(&ServerMessage::game_start(), &[]);
        for board in Board::ALL {
            let turn = self.turn(board);
            self.table
                .broadcast(&ServerMessage::turn_update(board, turn), &[]);
        }
    }
    fn validate(&self, client: &Client, play: &Play) -> Option<(Position, Role, Board)> {
        let pos = self.table.position(client)?;
        let role = Role::nth(pos)?;
        let board = play.board()?;
        (role.color == self.turn(board)).then_some((pos, role, board))
    }
    fn flip(&mut self, board: Board) -> Color {
        let turn = &mut self.turns[board.index()];
        *turn = turn.flip();
        *turn
    }
    /// Hands a captured piece to the capturer's partner, if seated.
    fn bank(&mut self, pos: Position, piece: Value) {
        let role = ROLES[pos];
        let mate = self
            .table
            .positions()
            .find(|other| ROLES[*other].is_teammate(&role));
        match mate {
            Some(mate) => self.table.unicast(mate, &ServerMessage::add_to_bank(piece)),
            None => log::debug!("[room {}] P{} capture dropped: no teammate", self.id, pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn drain(outbox: &mut Outbox) -> Vec<Value> {
        std::iter::from_fn(|| outbox.try_recv().ok())
            .map(|s| serde_json::from_str(&s).unwrap())
            .collect()
    }
    fn play(json: Value) -> Play {
        match Protocol::decode(&json.to_string()) {
            Ok(ClientMessage::Play(play)) => play,
            other => panic!("not a play: {:?}", other),
        }
    }
    fn chat(json: Value) -> Map<String, Value> {
        match json {
            Value::Object(map) => map,
            other => panic!("not an object: {:?}", other),
        }
    }
    /// Room with four seated clients and their drained outboxes.
    fn full() -> (Room, Vec<Client>, Vec<Outbox>) {
        let mut room = Room::new("test");
        let (clients, mut outboxes): (Vec<_>, Vec<_>) = (0..4).map(|_| Client::pair(32)).unzip();
        for client in clients.iter() {
            room.join(client).unwrap();
        }
        outboxes.iter_mut().for_each(|o| {
            drain(o);
        });
        (room, clients, outboxes)
    }

    #[test]
    fn joiners_receive_roles_in_table_order() {
        let mut room = Room::new("r");
        for (i, role) in ROLES.iter().enumerate() {
            let (client, _outbox) = Client::pair(32);
            assert_eq!(room.join(&client), Ok(*role));
            assert_eq!(room.player_count(), i + 1);
        }
    }
    #[test]
    fn fifth_join_is_rejected_without_mutation() {
        let (mut room, _clients, mut outboxes) = full();
        let (late, mut late_rx) = Client::pair(32);
        assert_eq!(room.join(&late), Err(RoomError::RoomFull));
        assert_eq!(room.player_count(), 4);
        assert_eq!(room.role_of(&late), None);
        assert_eq!(
            drain(&mut late_rx),
            vec![json!({ "type": "error", "message": "Room is full!" })]
        );
        assert!(late.alive());
        assert!(outboxes.iter_mut().all(|o| drain(o).is_empty()));
    }
    #[test]
    fn double_join_is_rejected() {
        let mut room = Room::new("r");
        let (client, mut rx) = Client::pair(32);
        room.join(&client).unwrap();
        drain(&mut rx);
        assert_eq!(room.join(&client), Err(RoomError::AlreadySeated));
        assert_eq!(room.player_count(), 1);
        assert_eq!(drain(&mut rx)[0]["type"], json!("error"));
    }
    #[test]
    fn four_joins_produce_full_opening_sequence() {
        let mut room = Room::new("r");
        let (clients, mut outboxes): (Vec<_>, Vec<_>) = (0..4).map(|_| Client::pair(32)).unzip();
        for client in clients.iter() {
            room.join(client).unwrap();
        }
        for (i, outbox) in outboxes.iter_mut().enumerate() {
            let role = ROLES[i];
            let mut expected = vec![json!({
                "type": "assignment",
                "team": role.team,
                "board": role.board,
                "color": role.color,
            })];
            expected.extend((i + 1..=4).map(|n| json!({ "type": "player_joined", "player_count": n })));
            expected.push(json!({ "type": "game_start" }));
            expected.push(json!({ "type": "turn_update", "board": 1, "next_turn": "white" }));
            expected.push(json!({ "type": "turn_update", "board": 2, "next_turn": "white" }));
            assert_eq!(drain(outbox), expected, "seat {}", i);
        }
    }
    #[test]
    fn out_of_turn_play_is_rejected_for_both_colors_and_boards() {
        let (mut room, clients, mut outboxes) = full();
        // black on board 1, then black on board 2, while white is to move
        for (seat, board) in [(1, 1), (2, 2)] {
            let result = room.submit(&clients[seat], play(json!({ "type": "move", "board": board })));
            assert_eq!(result, Err(RoomError::InvalidAction));
            for (i, outbox) in outboxes.iter_mut().enumerate() {
                let got = drain(outbox);
                if i == seat {
                    assert_eq!(got, vec![json!({ "type": "error", "message": NOT_YOUR_TURN })]);
                } else {
                    assert!(got.is_empty());
                }
            }
        }
        assert_eq!(room.turn(Board::One), Color::White);
        assert_eq!(room.turn(Board::Two), Color::White);
        // hand both boards to black, then white is out of turn
        room.submit(&clients[0], play(json!({ "type": "move", "board": 1 }))).unwrap();
        room.submit(&clients[3], play(json!({ "type": "move", "board": 2 }))).unwrap();
        outboxes.iter_mut().for_each(|o| {
            drain(o);
        });
        for (seat, board) in [(0, 1), (3, 2)] {
            let result = room.submit(&clients[seat], play(json!({ "type": "drop", "board": board })));
            assert_eq!(result, Err(RoomError::InvalidAction));
            assert_eq!(drain(&mut outboxes[seat]).len(), 1);
        }
        assert_eq!(room.turn(Board::One), Color::Black);
        assert_eq!(room.turn(Board::Two), Color::Black);
    }
    #[test]
    fn unknown_board_is_rejected() {
        let (mut room, clients, mut outboxes) = full();
        let result = room.submit(&clients[0], play(json!({ "type": "move", "board": 3 })));
        assert_eq!(result, Err(RoomError::InvalidAction));
        assert_eq!(drain(&mut outboxes[0])[0]["message"], json!(NOT_YOUR_TURN));
        assert!(drain(&mut outboxes[1]).is_empty());
    }
    #[test]
    fn unseated_play_is_rejected() {
        let (mut room, _clients, mut outboxes) = full();
        let (stranger, mut rx) = Client::pair(32);
        let result = room.submit(&stranger, play(json!({ "type": "move", "board": 1 })));
        assert_eq!(result, Err(RoomError::InvalidAction));
        assert_eq!(drain(&mut rx).len(), 1);
        assert!(outboxes.iter_mut().all(|o| drain(o).is_empty()));
    }
    #[test]
    fn valid_move_echoes_then_flips_turn() {
        let (mut room, clients, mut outboxes) = full();
        let mv = json!({ "type": "move", "from": "e2", "to": "e4", "board": "1", "captured_piece": null });
        assert_eq!(room.submit(&clients[0], play(mv.clone())), Ok(Color::Black));
        assert_eq!(room.turn(Board::One), Color::Black);
        assert_eq!(room.turn(Board::Two), Color::White);
        let mut echo = mv;
        echo["sender_role"] = json!({ "team": "A", "board": 1, "color": "white" });
        for outbox in outboxes.iter_mut() {
            assert_eq!(
                drain(outbox),
                vec![
                    echo.clone(),
                    json!({ "type": "turn_update", "board": 1, "next_turn": "black" }),
                ]
            );
        }
    }
    #[test]
    fn valid_drop_flips_turn_without_bank() {
        let (mut room, clients, mut outboxes) = full();
        let drop = json!({ "type": "drop", "piece": "♘", "to": "f3", "board": 2 });
        assert_eq!(room.submit(&clients[3], play(drop)), Ok(Color::Black));
        for outbox in outboxes.iter_mut() {
            let got = drain(outbox);
            assert_eq!(got.len(), 2);
            assert_eq!(got[0]["type"], json!("drop"));
            assert_eq!(got[1], json!({ "type": "turn_update", "board": 2, "next_turn": "black" }));
        }
    }
    #[test]
    fn capture_banks_to_teammate_only() {
        let (mut room, clients, mut outboxes) = full();
        let mv = json!({ "type": "move", "from": "d1", "to": "d7", "board": 1, "captured_piece": "♟" });
        room.submit(&clients[0], play(mv)).unwrap();
        let received = outboxes.iter_mut().map(drain).collect::<Vec<_>>();
        let banks = received
            .iter()
            .map(|msgs| msgs.iter().filter(|m| m["type"] == json!("add_to_bank")).count())
            .collect::<Vec<_>>();
        assert_eq!(banks, vec![0, 0, 1, 0]);
        assert_eq!(
            received[2],
            vec![
                received[0][0].clone(),
                json!({ "type": "add_to_bank", "piece": "♟" }),
                json!({ "type": "turn_update", "board": 1, "next_turn": "black" }),
            ]
        );
    }
    #[test]
    fn capture_without_teammate_is_dropped() {
        let mut room = Room::new("r");
        let (a, mut rx_a) = Client::pair(32);
        let (b, mut rx_b) = Client::pair(32);
        room.join(&a).unwrap();
        room.join(&b).unwrap();
        drain(&mut rx_a);
        drain(&mut rx_b);
        let mv = json!({ "type": "move", "board": 1, "captured_piece": "♟" });
        assert_eq!(room.submit(&a, play(mv)), Ok(Color::Black));
        for rx in [&mut rx_a, &mut rx_b] {
            assert!(drain(rx).iter().all(|m| m["type"] != json!("add_to_bank")));
        }
    }
    #[test]
    fn capture_after_teammate_left_is_dropped() {
        let (mut room, clients, mut outboxes) = full();
        room.leave(&clients[3]);
        let mv = json!({ "type": "move", "board": 1, "captured_piece": "♝" });
        room.submit(&clients[1], play(json!({ "type": "move", "board": 1 }))).unwrap_err();
        room.submit(&clients[0], play(json!({ "type": "move", "board": 1 }))).unwrap();
        room.submit(&clients[1], play(mv)).unwrap();
        assert!(drain(&mut outboxes[3]).is_empty());
        assert!(
            outboxes
                .iter_mut()
                .flat_map(drain)
                .all(|m| m["type"] != json!("add_to_bank"))
        );
    }
    #[test]
    fn chat_reaches_everyone_with_sender_role() {
        let (mut room, clients, mut outboxes) = full();
        room.chat(&clients[1], chat(json!({ "type": "chat", "message": "gl" }))).unwrap();
        for outbox in outboxes.iter_mut() {
            assert_eq!(
                drain(outbox),
                vec![json!({
                    "type": "chat",
                    "message": "gl",
                    "sender_role": { "team": "B", "board": 1, "color": "black" },
                })]
            );
        }
    }
    #[test]
    fn chat_from_unseated_is_dropped() {
        let (mut room, _clients, mut outboxes) = full();
        let (stranger, mut rx) = Client::pair(32);
        let result = room.chat(&stranger, chat(json!({ "type": "chat", "message": "hi" })));
        assert_eq!(result, Err(RoomError::InvalidAction));
        assert!(drain(&mut rx).is_empty());
        assert!(outboxes.iter_mut().all(|o| drain(o).is_empty()));
    }
    #[test]
    fn leaving_keeps_roles_reserved() {
        let mut room = Room::new("r");
        let (a, _rx_a) = Client::pair(32);
        room.join(&a).unwrap();
        assert_eq!(room.leave(&a), Some(ROLES[0]));
        assert_eq!(room.leave(&a), None);
        assert!(room.is_abandoned());
        let (b, _rx_b) = Client::pair(32);
        assert_eq!(room.join(&b), Ok(ROLES[1]));
        assert!(!room.is_abandoned());
        assert_eq!(room.player_count(), 2);
    }
    #[test]
    fn departed_seat_receives_nothing() {
        let (mut room, clients, mut outboxes) = full();
        room.leave(&clients[2]);
        room.submit(&clients[0], play(json!({ "type": "move", "board": 1 }))).unwrap();
        assert!(drain(&mut outboxes[2]).is_empty());
        assert_eq!(drain(&mut outboxes[1]).len(), 2);
    }
    #[test]
    fn dead_connection_is_vacated_mid_broadcast() {
        let (mut room, clients, mut outboxes) = full();
        let dead = outboxes.remove(1);
        drop(dead);
        room.submit(&clients[0], play(json!({ "type": "move", "board": 1 }))).unwrap();
        assert!(!clients[1].alive());
        assert_eq!(room.role_of(&clients[1]), None);
        for (i, outbox) in outboxes.iter_mut().enumerate() {
            assert_eq!(drain(outbox).len(), 2, "remaining seat {}", i);
        }
        assert_eq!(room.turn(Board::One), Color::Black);
    }
}
