use super::*;
use crate::ID;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use tokio::sync::Notify;
use tokio::sync::mpsc::Receiver;
use tokio::sync::mpsc::Sender;
use tokio::sync::mpsc::channel;
use tokio::sync::mpsc::error::TrySendError;

/// Receiving half of a client's outbound buffer, drained by the socket task.
pub type Outbox = Receiver<String>;

/// Handle to one remote participant.
///
/// Sends never block: frames go into a bounded buffer that the socket task
/// drains. A full buffer means the peer stopped reading, which is treated
/// the same as a dead peer. Severing wakes the socket task so it can close.
#[derive(Clone, Debug)]
pub struct Client {
    id: ID<Client>,
    tx: Sender<String>,
    alive: Arc<AtomicBool>,
    kick: Arc<Notify>,
}

impl Client {
    /// Creates a handle and the outbox its frames are delivered to.
    pub fn pair(capacity: usize) -> (Self, Outbox) {
        let (tx, rx) = channel(capacity.max(1));
        let client = Self {
            id: ID::default(),
            tx,
            alive: Arc::new(AtomicBool::new(true)),
            kick: Arc::new(Notify::new()),
        };
        (client, rx)
    }
    pub fn id(&self) -> ID<Client> {
        self.id
    }
    pub fn alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }
    /// Queues a text frame without waiting.
    pub fn send(&self, text: String) -> Result<(), RoomError> {
        if !self.alive() {
            return Err(RoomError::DeliveryFailure);
        }
        match self.tx.try_send(text) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                log::warn!("[client {}] outbound buffer full", self.id);
                Err(RoomError::DeliveryFailure)
            }
            Err(TrySendError::Closed(_)) => {
                log::debug!("[client {}] outbound closed", self.id);
                Err(RoomError::DeliveryFailure)
            }
        }
    }
    /// Sends a message to this client alone, severing it on failure.
    pub fn reply(&self, message: &ServerMessage) {
        if self.send(message.to_json()).is_err() {
            self.sever();
        }
    }
    /// Marks the client dead and wakes its socket task.
    pub fn sever(&self) {
        if self.alive.swap(false, Ordering::SeqCst) {
            log::info!("[client {}] severed", self.id);
        }
        self.kick.notify_one();
    }
    /// Resolves once the client has been severed.
    pub async fn severed(&self) {
        self.kick.notified().await
    }
}

impl PartialEq for Client {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for Client {}
