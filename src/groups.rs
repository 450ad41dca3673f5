//! In-process pub/sub fabric: named groups of live connections with
//! dynamic join/leave and fan-out send. Groups exist only while they
//! have members; nothing here is persisted.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::chat::events::Event;

/// Handle for one open transport, usable for joining groups. The paired
/// receiver returned by [`GroupRegistry::connect`] is the connection's
/// outbound event queue.
pub struct Connection {
    id: u64,
    tx: UnboundedSender<Event>,
}

impl Connection {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Membership in one group, held by the owning connection task. Dropping
/// it leaves the group, so every exit path of the task unsubscribes
/// exactly once.
pub struct Membership {
    registry: GroupRegistry,
    group: String,
    conn_id: u64,
}

impl Drop for Membership {
    fn drop(&mut self) {
        self.registry.leave(&self.group, self.conn_id);
    }
}

/// Cheap-to-clone handle; all clones share the same membership map.
#[derive(Clone)]
pub struct GroupRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    groups: Mutex<HashMap<String, HashMap<u64, UnboundedSender<Event>>>>,
    next_id: AtomicU64,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                groups: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Allocate a connection handle and its outbound event queue.
    pub fn connect(&self) -> (Connection, UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        (Connection { id, tx }, rx)
    }

    /// Subscribe `conn` to `group`. Joining the same group twice is a
    /// no-op beyond the first.
    pub fn join(&self, group: &str, conn: &Connection) -> Membership {
        let mut groups = self.inner.groups.lock().unwrap();
        groups
            .entry(group.to_owned())
            .or_default()
            .insert(conn.id, conn.tx.clone());

        Membership {
            registry: self.clone(),
            group: group.to_owned(),
            conn_id: conn.id,
        }
    }

    /// Remove a connection from a group. Leaving a group the connection
    /// is not in is a no-op; empty groups are pruned.
    pub fn leave(&self, group: &str, conn_id: u64) {
        let mut groups = self.inner.groups.lock().unwrap();
        if let Some(members) = groups.get_mut(group) {
            members.remove(&conn_id);
            if members.is_empty() {
                groups.remove(group);
            }
        }
    }

    /// Fan `event` out to every connection currently in `group`. A group
    /// with no members swallows the event, and a member whose transport
    /// has gone away is skipped without affecting the rest.
    pub fn send(&self, group: &str, event: &Event) {
        let members: Vec<UnboundedSender<Event>> = {
            let groups = self.inner.groups.lock().unwrap();
            match groups.get(group) {
                Some(members) => members.values().cloned().collect(),
                None => return,
            }
        };

        for tx in members {
            let _ = tx.send(event.clone());
        }
    }

    /// Server-originated variant of [`send`](Self::send); same fan-out
    /// semantics.
    pub fn dispatch(&self, group: &str, event: &Event) {
        self.send(group, event);
    }

    pub fn member_count(&self, group: &str) -> usize {
        self.inner
            .groups
            .lock()
            .unwrap()
            .get(group)
            .map_or(0, |members| members.len())
    }
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat(message: &str) -> Event {
        Event::Chat {
            message: message.to_owned(),
            sender: "alice".to_owned(),
        }
    }

    #[tokio::test]
    async fn send_reaches_every_member() {
        let registry = GroupRegistry::new();
        let (a, mut rx_a) = registry.connect();
        let (b, mut rx_b) = registry.connect();
        let _ma = registry.join("room", &a);
        let _mb = registry.join("room", &b);

        registry.send("room", &chat("hi"));

        assert!(matches!(rx_a.try_recv(), Ok(Event::Chat { .. })));
        assert!(matches!(rx_b.try_recv(), Ok(Event::Chat { .. })));
    }

    #[tokio::test]
    async fn send_to_empty_group_is_a_noop() {
        let registry = GroupRegistry::new();
        registry.send("nowhere", &chat("hi"));
        assert_eq!(registry.member_count("nowhere"), 0);
    }

    #[tokio::test]
    async fn join_and_leave_are_idempotent() {
        let registry = GroupRegistry::new();
        let (conn, _rx) = registry.connect();

        let first = registry.join("room", &conn);
        let second = registry.join("room", &conn);
        assert_eq!(registry.member_count("room"), 1);

        drop(second);
        assert_eq!(registry.member_count("room"), 0);

        // Leaving again after the membership is gone changes nothing.
        registry.leave("room", conn.id());
        drop(first);
        assert_eq!(registry.member_count("room"), 0);
    }

    #[tokio::test]
    async fn dropped_membership_no_longer_receives() {
        let registry = GroupRegistry::new();
        let (a, mut rx_a) = registry.connect();
        let (b, mut rx_b) = registry.connect();
        let ma = registry.join("room", &a);
        let _mb = registry.join("room", &b);

        drop(ma);
        registry.send("room", &chat("late"));

        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_ok());
    }

    #[tokio::test]
    async fn dead_transport_does_not_block_the_rest() {
        let registry = GroupRegistry::new();
        let (a, rx_a) = registry.connect();
        let (b, mut rx_b) = registry.connect();
        let _ma = registry.join("room", &a);
        let _mb = registry.join("room", &b);

        drop(rx_a);
        registry.send("room", &chat("hi"));

        assert!(rx_b.try_recv().is_ok());
    }
}
