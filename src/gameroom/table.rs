use super::*;
use crate::Position;
use crate::SEATS;

/// Seats of one room and fan-out to whoever still occupies them.
///
/// Seats are claimed in join order and never released: a departed player
/// leaves a vacant slot behind, so its role cannot be handed out again.
#[derive(Debug, Default)]
pub struct Table {
    seats: [Option<Client>; SEATS],
    claimed: usize,
}

impl Table {
    /// Claims the next seat for a client. None when every seat is claimed.
    pub fn claim(&mut self, client: Client) -> Option<Position> {
        let pos = self.claimed;
        self.seats.get_mut(pos).map(|seat| {
            *seat = Some(client);
            pos
        })?;
        self.claimed += 1;
        Some(pos)
    }
    /// Removes the client at a position, keeping the seat claimed.
    pub fn vacate(&mut self, pos: Position) -> Option<Client> {
        self.seats.get_mut(pos).and_then(Option::take)
    }
    /// Seats handed out so far, vacated ones included.
    pub fn claimed(&self) -> usize {
        self.claimed
    }
    /// Seats still held by a live connection.
    pub fn occupied(&self) -> usize {
        self.seats.iter().flatten().count()
    }
    pub fn is_full(&self) -> bool {
        self.claimed >= SEATS
    }
    pub fn position(&self, client: &Client) -> Option<Position> {
        self.seats
            .iter()
            .position(|seat| seat.as_ref() == Some(client))
    }
    pub fn client(&self, pos: Position) -> Option<&Client> {
        self.seats.get(pos).and_then(Option::as_ref)
    }
    /// Occupied positions in join order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.seats
            .iter()
            .enumerate()
            .filter_map(|(i, seat)| seat.as_ref().map(|_| i))
    }
    /// Sends a message to a single seat.
    pub fn unicast(&mut self, pos: Position, message: &ServerMessage) {
        let json = message.to_json();
        log::debug!("[table] unicast to P{}: {}", pos, json);
        self.deliver(pos, json);
    }
    /// Sends a message to every occupied seat not in `exclude`.
    /// Each delivery stands alone; a failed seat is dropped and the rest still receive.
    pub fn broadcast(&mut self, message: &ServerMessage, exclude: &[Position]) {
        let json = message.to_json();
        log::debug!("[table] broadcast: {}", json);
        let targets = self
            .positions()
            .filter(|pos| !exclude.contains(pos))
            .collect::<Vec<_>>();
        for pos in targets {
            self.deliver(pos, json.clone());
        }
    }
    fn deliver(&mut self, pos: Position, json: String) {
        match self.client(pos).map(|client| client.send(json)) {
            Some(Ok(())) => {}
            Some(Err(e)) => {
                log::warn!("[table] delivery to P{} failed: {}", pos, e);
                if let Some(client) = self.vacate(pos) {
                    client.sever();
                }
            }
            None => log::warn!("[table] delivery to P{}: no such player", pos),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    fn drain(outbox: &mut Outbox) -> Vec<String> {
        std::iter::from_fn(|| outbox.try_recv().ok()).collect()
    }
    #[test]
    fn table_claims_in_order() {
        let mut table = Table::default();
        for i in 0..SEATS {
            let (client, _) = Client::pair(4);
            assert_eq!(table.claim(client), Some(i));
        }
        let (late, _) = Client::pair(4);
        assert_eq!(table.claim(late), None);
        assert_eq!(table.claimed(), SEATS);
        assert!(table.is_full());
    }
    #[test]
    fn vacated_seat_stays_claimed() {
        let mut table = Table::default();
        let (client, _outbox) = Client::pair(4);
        table.claim(client.clone());
        assert_eq!(table.vacate(0), Some(client.clone()));
        assert_eq!(table.claimed(), 1);
        assert_eq!(table.occupied(), 0);
        assert_eq!(table.position(&client), None);
        let (next, _outbox) = Client::pair(4);
        assert_eq!(table.claim(next), Some(1));
    }
    #[test]
    fn broadcast_respects_exclusions() {
        let mut table = Table::default();
        let (a, mut rx_a) = Client::pair(4);
        let (b, mut rx_b) = Client::pair(4);
        table.claim(a);
        table.claim(b);
        table.broadcast(&ServerMessage::game_start(), &[1]);
        assert_eq!(drain(&mut rx_a).len(), 1);
        assert!(drain(&mut rx_b).is_empty());
    }
    #[test]
    fn broadcast_survives_dead_seat() {
        let mut table = Table::default();
        let (a, rx_a) = Client::pair(4);
        let (b, mut rx_b) = Client::pair(4);
        let (c, mut rx_c) = Client::pair(4);
        table.claim(a.clone());
        table.claim(b);
        table.claim(c);
        drop(rx_a);
        table.broadcast(&ServerMessage::game_start(), &[]);
        assert_eq!(drain(&mut rx_b).len(), 1);
        assert_eq!(drain(&mut rx_c).len(), 1);
        assert!(!a.alive());
        assert_eq!(table.client(0), None);
        assert_eq!(table.occupied(), 2);
    }
    #[test]
    fn slow_seat_is_dropped() {
        let mut table = Table::default();
        let (slow, _rx_slow) = Client::pair(1);
        let (fast, mut rx_fast) = Client::pair(8);
        table.claim(slow.clone());
        table.claim(fast);
        table.broadcast(&ServerMessage::player_joined(1), &[]);
        table.broadcast(&ServerMessage::player_joined(2), &[]);
        assert!(!slow.alive());
        assert_eq!(table.positions().collect::<Vec<_>>(), vec![1]);
        assert_eq!(drain(&mut rx_fast).len(), 2);
    }
}
