//! Connection registry.
//!
//! The authoritative set of live connections, guarded by a mutex so that
//! every connection task can add, remove and count concurrently.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc::{self, error::TrySendError};

/// A serialized frame shared by every recipient of one broadcast.
pub type Frame = Arc<str>;

/// Receiving half of a connection's outbound queue, drained by the
/// transport writer.
pub type Outbox = mpsc::Receiver<Frame>;

/// Frames a connection may have queued before it counts as stalled.
pub const OUTBOX_CAPACITY: usize = 100;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to one client session.
///
/// Cloning yields another handle to the same session; equality goes by
/// [`ConnectionId`] only.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    tx: mpsc::Sender<Frame>,
}

/// A frame could not be queued for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    /// The writer stopped draining and the outbox is full.
    #[error("connection {0} is not keeping up")]
    Full(ConnectionId),

    /// The writer has exited.
    #[error("connection {0} is closed")]
    Closed(ConnectionId),
}

impl SendError {
    pub fn connection(&self) -> ConnectionId {
        match *self {
            SendError::Full(id) | SendError::Closed(id) => id,
        }
    }
}

impl Connection {
    /// Creates a connection and the outbox its writer should drain.
    pub fn open() -> (Self, Outbox) {
        let (tx, rx) = mpsc::channel(OUTBOX_CAPACITY);
        let id = ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        (Self { id, tx }, rx)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues a frame for this connection without waiting. Frames are
    /// delivered in the order they are queued.
    pub fn send(&self, frame: Frame) -> Result<(), SendError> {
        self.tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => SendError::Full(self.id),
            TrySendError::Closed(_) => SendError::Closed(self.id),
        })
    }
}

impl PartialEq for Connection {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Connection {}

/// Outcome of [`Registry::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// This call took the connection out of the set.
    Removed { remaining: usize },
    /// The connection was not a member (already removed or never added).
    Absent { remaining: usize },
}

impl Removal {
    /// Live count after the call.
    pub fn remaining(self) -> usize {
        match self {
            Removal::Removed { remaining } | Removal::Absent { remaining } => remaining,
        }
    }
}

/// Set of live connections, unique by identity.
#[derive(Debug, Default)]
pub struct Registry {
    members: Mutex<HashMap<ConnectionId, Connection>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic while holding the lock cannot leave the map half-updated,
    // so a poisoned lock is still safe to use.
    fn members(&self) -> MutexGuard<'_, HashMap<ConnectionId, Connection>> {
        self.members.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a connection and returns the live count afterwards.
    ///
    /// Adding a connection that is already present is a no-op.
    pub fn add(&self, conn: Connection) -> usize {
        let mut members = self.members();
        members.entry(conn.id()).or_insert(conn);
        members.len()
    }

    /// Removes a connection if present. Removing twice is harmless.
    pub fn remove(&self, id: ConnectionId) -> Removal {
        let mut members = self.members();
        let removed = members.remove(&id).is_some();
        let remaining = members.len();
        if removed {
            Removal::Removed { remaining }
        } else {
            Removal::Absent { remaining }
        }
    }

    /// Removes every listed connection; returns how many were present.
    pub fn remove_all(&self, ids: &[ConnectionId]) -> usize {
        let mut members = self.members();
        ids.iter().filter(|id| members.remove(*id).is_some()).count()
    }

    pub fn count(&self) -> usize {
        self.members().len()
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, id: ConnectionId) -> bool {
        self.members().contains_key(&id)
    }

    /// Copies the current membership so it can be iterated without
    /// holding the lock.
    pub fn snapshot(&self) -> Vec<Connection> {
        self.members().values().cloned().collect()
    }
}
