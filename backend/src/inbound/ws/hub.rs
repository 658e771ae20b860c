//! Per-user connection rooms.
//!
//! Every authenticated socket registers an unbounded sender under its
//! user's room. Pushing to a user fans the encoded frame out to every live
//! connection in the room; senders whose receiver has gone away are pruned
//! on the next push and when the session unregisters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::debug;

use crate::domain::ports::{NotificationPush, NotificationPushError};
use crate::domain::{Notification, UserId};
use crate::inbound::ws::messages::ServerEvent;

/// Identifier of one socket within the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

type Room = HashMap<ConnectionId, UnboundedSender<String>>;

/// Registry of live sockets keyed by user.
#[derive(Debug, Default)]
pub struct ConnectionHub {
    rooms: RwLock<HashMap<UserId, Room>>,
    next_id: AtomicU64,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self::default()
    }

    // Rooms hold only senders and stay consistent across a poisoning panic.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<UserId, Room>> {
        self.rooms.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<UserId, Room>> {
        self.rooms.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Join `user`'s room; frames pushed to the user arrive on the receiver.
    pub fn register(&self, user: &UserId) -> (ConnectionId, UnboundedReceiver<String>) {
        let id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (sender, receiver) = unbounded_channel();
        let mut rooms = self.write();
        let room = rooms.entry(user.clone()).or_default();
        room.insert(id, sender);
        debug!(user_id = %user, connection = %id, connections = room.len(), "socket joined room");
        (id, receiver)
    }

    /// Leave `user`'s room, dropping the room once empty.
    pub fn unregister(&self, user: &UserId, id: ConnectionId) {
        let mut rooms = self.write();
        if let Some(room) = rooms.get_mut(user) {
            room.remove(&id);
            room.retain(|_, sender| !sender.is_closed());
            if room.is_empty() {
                rooms.remove(user);
            }
        }
        debug!(user_id = %user, connection = %id, "socket left room");
    }

    /// Number of live sockets for `user`.
    pub fn connection_count(&self, user: &UserId) -> usize {
        self.read()
            .get(user)
            .map_or(0, |room| room.values().filter(|s| !s.is_closed()).count())
    }

    /// Send `frame` to every socket of `user`; returns how many accepted it.
    pub fn send_to_user(&self, user: &UserId, frame: &str) -> usize {
        let (delivered, stale) = {
            let rooms = self.read();
            let Some(room) = rooms.get(user) else {
                return 0;
            };
            let mut delivered = 0;
            let mut stale = Vec::new();
            for (id, sender) in room {
                if sender.send(frame.to_owned()).is_ok() {
                    delivered += 1;
                } else {
                    stale.push(*id);
                }
            }
            (delivered, stale)
        };

        if !stale.is_empty() {
            let mut rooms = self.write();
            if let Some(room) = rooms.get_mut(user) {
                for id in &stale {
                    room.remove(id);
                }
                if room.is_empty() {
                    rooms.remove(user);
                }
            }
            debug!(user_id = %user, pruned = stale.len(), "pruned closed sockets");
        }
        delivered
    }

    fn push_event(&self, user: &UserId, event: &ServerEvent) -> Result<usize, NotificationPushError> {
        let frame = event
            .to_text()
            .map_err(|error| NotificationPushError::delivery(error.to_string()))?;
        Ok(self.send_to_user(user, &frame))
    }
}

impl NotificationPush for ConnectionHub {
    fn push_notification(
        &self,
        recipient: &UserId,
        notification: &Notification,
    ) -> Result<usize, NotificationPushError> {
        self.push_event(recipient, &ServerEvent::new_notification(notification))
    }

    fn push_unread_count(
        &self,
        recipient: &UserId,
        count: u64,
    ) -> Result<usize, NotificationPushError> {
        self.push_event(recipient, &ServerEvent::unread_count(count))
    }
}
