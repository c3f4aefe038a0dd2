//! Broadcast engine.
//!
//! Fans a message out to every registered connection and keeps the
//! registry accurate: a connection whose send fails is evicted once the
//! whole fan-out has been attempted.

use std::sync::Arc;

use crate::relay::message::{decode_inbound, Outbound};
use crate::relay::registry::{Connection, ConnectionId, Frame, Registry, Removal};

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The client closed the connection cleanly.
    Closed,
    /// The transport failed while reading or writing.
    Lost,
}

/// Proof of membership handed out by [`Broadcaster::connect`].
///
/// Not `Clone`: [`Broadcaster::disconnect`] consumes it, so a session can
/// only leave once.
#[derive(Debug)]
#[must_use = "a member must be passed to `disconnect` when its session ends"]
pub struct Member {
    id: ConnectionId,
}

impl Member {
    #[cfg(test)]
    pub(crate) fn id(&self) -> ConnectionId {
        self.id
    }
}

/// Result of one fan-out.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Members in the snapshot.
    pub attempted: usize,
    /// Members the frame was queued for.
    pub delivered: usize,
    /// Members removed from the registry because their send failed.
    pub evicted: usize,
}

/// Delivers messages to all live connections.
#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Arc<Registry>,
}

impl Broadcaster {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    #[cfg(test)]
    pub(crate) fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Current number of live connections.
    pub fn online(&self) -> usize {
        self.registry.count()
    }

    /// Sends `message` to every connection live at the time of the call.
    ///
    /// Never fails: connections that cannot be written to are removed
    /// from the registry after every member has been attempted.
    pub fn broadcast(&self, message: &Outbound) -> BroadcastReport {
        match message.to_frame() {
            Ok(frame) => self.broadcast_frame(Arc::from(frame)),
            Err(e) => {
                tracing::error!(?e, "Failed to serialize broadcast message");
                BroadcastReport::default()
            }
        }
    }

    fn broadcast_frame(&self, frame: Frame) -> BroadcastReport {
        let snapshot = self.registry.snapshot();

        // Phase 1: attempt every member, collecting failures.
        let failed: Vec<ConnectionId> = snapshot
            .iter()
            .filter_map(|conn| conn.send(Arc::clone(&frame)).err())
            .map(|e| {
                tracing::debug!(error = %e, "Send failed, evicting connection");
                e.connection()
            })
            .collect();

        // Phase 2: evict.
        let evicted = if failed.is_empty() {
            0
        } else {
            self.registry.remove_all(&failed)
        };
        if evicted > 0 {
            tracing::warn!(
                evicted,
                online = self.registry.count(),
                "Evicted broken connections"
            );
        }

        BroadcastReport {
            attempted: snapshot.len(),
            delivered: snapshot.len() - failed.len(),
            evicted,
        }
    }

    /// Registers a new connection and announces it to everyone, the new
    /// connection included.
    pub fn connect(&self, conn: Connection) -> Member {
        let id = conn.id();
        let online = self.registry.add(conn);
        tracing::info!(connection = %id, online, "Connection joined");

        self.broadcast(&Outbound::joined(online));
        Member { id }
    }

    /// Removes the member and, if anyone is left, tells them.
    ///
    /// The member may already have been evicted by a failed broadcast;
    /// the remaining members are notified either way.
    pub fn disconnect(&self, member: Member, reason: DisconnectReason) {
        let removal = self.registry.remove(member.id);
        let online = removal.remaining();
        tracing::info!(
            connection = %member.id,
            online,
            ?reason,
            evicted = matches!(removal, Removal::Absent { .. }),
            "Connection left"
        );

        if online == 0 {
            return;
        }
        let notice = match reason {
            DisconnectReason::Closed => Outbound::left(online),
            DisconnectReason::Lost => Outbound::lost(online),
        };
        self.broadcast(&notice);
    }

    /// Decodes a client frame and relays it to everyone.
    ///
    /// Returns `None` when the frame was dropped (malformed or blank).
    pub fn relay(&self, frame: &str) -> Option<BroadcastReport> {
        let Some(text) = decode_inbound(frame) else {
            tracing::debug!(len = frame.len(), "Ignoring inbound frame without text");
            return None;
        };
        Some(self.broadcast(&Outbound::message(text)))
    }
}
