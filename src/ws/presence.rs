//! Presence registry - which uids currently hold a live relay session.
//!
//! Each session is an unbounded sender of internal signals consumed by
//! that connection's write task. The registry also carries the
//! best-effort "viewing" hint used to suppress unread marks while a
//! conversation is on screen.

use crate::entities::ConversationKey;
use dashmap::DashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// Control-plane signals sent to a connection's write task.
pub enum InternalSignal {
    Shutdown,
    Subscribe(ConversationKey),
    Unsubscribe(ConversationKey),
    /// A message arrived while the conversation was not on screen.
    Unread { peer_uid: String },
    Error { code: u16, message: String },
}

pub struct PresenceMap {
    sessions: DashMap<String, UnboundedSender<InternalSignal>>,
    /// uid -> peer whose conversation is currently on screen. Advisory
    /// only; never authoritative.
    viewing: DashMap<String, String>,
}

impl PresenceMap {
    pub fn new() -> Self {
        PresenceMap {
            sessions: DashMap::new(),
            viewing: DashMap::new(),
        }
    }

    /// Register a live session. A reconnect overwrites the previous
    /// entry, closing the old session's signal channel.
    pub fn register_online(&self, uid: &str, tx: UnboundedSender<InternalSignal>) {
        info!(%uid, "Registering user as online");
        self.sessions.insert(uid.to_string(), tx);
        info!(online = self.sessions.len(), "Presence registry updated");
    }

    /// Deregister a session, but only while `tx` is still the stored
    /// sender. A reconnect overwrites the entry, and the old
    /// connection's cleanup may run long after that; it must not tear
    /// down the session that replaced it.
    pub fn remove_from_online(&self, uid: &str, tx: &UnboundedSender<InternalSignal>) {
        let removed = self
            .sessions
            .remove_if(uid, |_, current| current.same_channel(tx))
            .is_some();

        if removed {
            info!(%uid, "Removing user from online");
            self.viewing.remove(uid);
        } else {
            debug!(%uid, "Stale session cleanup skipped");
        }
    }

    /// Deliver a signal to a user's session if one is live; silently a
    /// no-op otherwise (the message itself is already persisted).
    pub fn send_if_online(&self, uid: &str, signal: InternalSignal) {
        if let Some(entry) = self.sessions.get(uid) {
            if entry.value().send(signal).is_err() {
                warn!(%uid, "Session channel closed, signal dropped");
            }
        } else {
            debug!(%uid, "User not online, signal not sent");
        }
    }

    pub fn is_online(&self, uid: &str) -> bool {
        self.sessions.contains_key(uid)
    }

    pub fn online_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn set_viewing(&self, uid: &str, peer_uid: &str) {
        self.viewing.insert(uid.to_string(), peer_uid.to_string());
    }

    pub fn clear_viewing(&self, uid: &str) {
        self.viewing.remove(uid);
    }

    /// True when `uid`'s session reports the conversation with
    /// `peer_uid` on screen.
    pub fn is_viewing(&self, uid: &str, peer_uid: &str) -> bool {
        self.viewing
            .get(uid)
            .map(|v| v.value() == peer_uid)
            .unwrap_or(false)
    }
}

impl Default for PresenceMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn duplicate_connection_overwrites() {
        let presence = PresenceMap::new();

        let (tx1, mut rx1) = mpsc::unbounded_channel();
        presence.register_online("uid-alice", tx1);
        assert!(presence.is_online("uid-alice"));
        assert_eq!(presence.online_count(), 1);

        // Second connection for the same uid replaces the first and
        // closes the old channel.
        let (tx2, _rx2) = mpsc::unbounded_channel();
        presence.register_online("uid-alice", tx2);
        assert_eq!(presence.online_count(), 1);

        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        assert!(rx1.try_recv().is_err());
    }

    #[tokio::test]
    async fn viewing_hint() {
        let presence = PresenceMap::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        presence.register_online("uid-bob", tx.clone());

        presence.set_viewing("uid-bob", "uid-alice");
        assert!(presence.is_viewing("uid-bob", "uid-alice"));
        assert!(!presence.is_viewing("uid-bob", "uid-carol"));

        presence.clear_viewing("uid-bob");
        assert!(!presence.is_viewing("uid-bob", "uid-alice"));

        // Disconnect clears the hint too.
        presence.set_viewing("uid-bob", "uid-alice");
        presence.remove_from_online("uid-bob", &tx);
        assert!(!presence.is_viewing("uid-bob", "uid-alice"));
    }

    #[tokio::test]
    async fn stale_cleanup_keeps_reconnected_session() {
        let presence = PresenceMap::new();

        let (tx1, _rx1) = mpsc::unbounded_channel();
        presence.register_online("uid-alice", tx1.clone());

        // Reconnect replaces the session before the first connection's
        // tasks have finished.
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        presence.register_online("uid-alice", tx2.clone());

        // The old connection's cleanup runs now; the live session must
        // survive it and still receive signals.
        presence.remove_from_online("uid-alice", &tx1);
        assert!(presence.is_online("uid-alice"));

        presence.send_if_online("uid-alice", InternalSignal::Shutdown);
        assert!(matches!(rx2.try_recv(), Ok(InternalSignal::Shutdown)));

        // The live session's own cleanup still deregisters it.
        presence.remove_from_online("uid-alice", &tx2);
        assert!(!presence.is_online("uid-alice"));
    }
}
