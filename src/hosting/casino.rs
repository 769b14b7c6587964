use crate::gameroom::Room;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::RwLock;

/// Shared handle to one room. The mutex serializes every operation on it.
pub type RoomHandle = Arc<Mutex<Room>>;

/// Process-wide registry of rooms, keyed by the id clients join with.
///
/// Rooms are created on first join and otherwise live for the process
/// lifetime; [`Casino::evict`] only removes rooms every player has left.
#[derive(Default)]
pub struct Casino {
    rooms: RwLock<HashMap<String, RoomHandle>>,
}

impl Casino {
    /// Returns the room with this id, creating it if unknown.
    /// Concurrent first joins observe the same room.
    pub async fn get_or_create(&self, id: &str) -> RoomHandle {
        if let Some(room) = self.rooms.read().await.get(id) {
            return room.clone();
        }
        self.rooms
            .write()
            .await
            .entry(id.to_string())
            .or_insert_with(|| {
                log::info!("[casino] opened room {}", id);
                Arc::new(Mutex::new(Room::new(id)))
            })
            .clone()
    }
    /// Looks up an existing room.
    pub async fn get(&self, id: &str) -> Option<RoomHandle> {
        self.rooms.read().await.get(id).cloned()
    }
    /// Removes a room once every claimed seat has been vacated.
    /// Returns whether the room was removed.
    ///
    /// Lock order is room then map. The map lock is never held while
    /// waiting on a room.
    pub async fn evict(&self, id: &str) -> bool {
        let Some(handle) = self.get(id).await else {
            return false;
        };
        let mut room = handle.lock().await;
        if !room.is_abandoned() {
            return false;
        }
        let mut rooms = self.rooms.write().await;
        if !rooms.get(id).is_some_and(|h| Arc::ptr_eq(h, &handle)) {
            return false;
        }
        room.close();
        rooms.remove(id);
        log::info!("[casino] evicted room {}", id);
        true
    }
    /// Number of live rooms.
    pub async fn len(&self) -> usize {
        self.rooms.read().await.len()
    }
    pub async fn is_empty(&self) -> bool {
        self.rooms.read().await.is_empty()
    }
}
