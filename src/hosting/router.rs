use super::*;
use crate::gameroom::*;
use serde_json::Map;
use serde_json::Value;
use std::sync::Arc;

/// Per-connection state: the outbound handle and the room joined, if any.
pub struct Session {
    client: Client,
    room: Option<RoomHandle>,
}

impl Session {
    pub fn new(client: Client) -> Self {
        Self { client, room: None }
    }
    pub fn client(&self) -> &Client {
        &self.client
    }
    pub fn room(&self) -> Option<&RoomHandle> {
        self.room.as_ref()
    }
}

/// Decodes client frames and applies them to the sender's room.
///
/// Each request holds its room's lock for validate + mutate + fan-out,
/// so requests on one room are strictly ordered while other rooms proceed.
pub struct Router {
    casino: Arc<Casino>,
    buffer: usize,
    evict: bool,
}

impl Router {
    pub fn new(casino: Arc<Casino>, buffer: usize, evict: bool) -> Self {
        Self {
            casino,
            buffer,
            evict,
        }
    }
    pub fn casino(&self) -> &Arc<Casino> {
        &self.casino
    }
    /// Opens a session for a new connection. The outbox carries its frames.
    pub fn session(&self) -> (Session, Outbox) {
        let (client, outbox) = Client::pair(self.buffer);
        (Session::new(client), outbox)
    }
    /// Handles one inbound text frame.
    pub async fn dispatch(&self, session: &mut Session, text: &str) {
        match Protocol::decode(text) {
            Ok(ClientMessage::Join { room }) => self.join(session, &room).await,
            Ok(ClientMessage::Play(play)) => self.play(session, play).await,
            Ok(ClientMessage::Chat(payload)) => self.chat(session, payload).await,
            Err(e) => {
                log::debug!("[router {}] {}", session.client.id(), e);
                session.client.reply(&ServerMessage::error(MALFORMED));
            }
        }
    }
    /// Releases the session's seat when its connection goes away.
    pub async fn disconnect(&self, mut session: Session) {
        let Some(handle) = session.room.take() else {
            return;
        };
        let (id, abandoned) = {
            let mut room = handle.lock().await;
            room.leave(&session.client);
            (room.id().to_string(), room.is_abandoned())
        };
        if self.evict && abandoned {
            self.casino.evict(&id).await;
        }
    }
}

impl Router {
    async fn join(&self, session: &mut Session, id: &str) {
        if session.room.is_some() {
            session
                .client
                .reply(&ServerMessage::from(RoomError::AlreadySeated));
            return;
        }
        loop {
            let handle = self.casino.get_or_create(id).await;
            let mut room = handle.lock().await;
            if room.is_closed() {
                continue;
            }
            if room.join(&session.client).is_ok() {
                drop(room);
                session.room = Some(handle);
            }
            return;
        }
    }
    async fn play(&self, session: &mut Session, play: Play) {
        match session.room.as_ref() {
            Some(handle) => {
                let _ = handle.lock().await.submit(&session.client, play);
            }
            None => session
                .client
                .reply(&ServerMessage::from(RoomError::InvalidAction)),
        }
    }
    async fn chat(&self, session: &mut Session, payload: Map<String, Value>) {
        match session.room.as_ref() {
            Some(handle) => {
                let _ = handle.lock().await.chat(&session.client, payload);
            }
            None => log::debug!("[router {}] dropped chat before join", session.client.id()),
        }
    }
}
