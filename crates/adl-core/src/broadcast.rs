//! Routes job updates to the one WebSocket connection that owns each job.
//!
//! Publishing never blocks and never fails: a job without an owner, or an
//! owner whose socket is gone, simply gets no push. Clients can always poll
//! `/api/status/{id}`.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use uuid::Uuid;

use crate::job::{parse_canonical_uuid, InvalidId, JobId, JobSnapshot};

/// Identifier handed to a client when its WebSocket connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for ConnectionId {
    type Err = InvalidId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_canonical_uuid(s).map(Self)
    }
}

impl TryFrom<String> for ConnectionId {
    type Error = InvalidId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ConnectionId> for String {
    fn from(id: ConnectionId) -> Self {
        id.to_string()
    }
}

/// Messages exchanged over `/ws`, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UpdateMessage {
    /// First message on every connection.
    Connection { connection_id: ConnectionId },
    JobUpdate { job_id: JobId, data: JobSnapshot },
    Ping,
    Pong,
}

#[derive(Default)]
struct Routes {
    connections: HashMap<ConnectionId, UnboundedSender<UpdateMessage>>,
    owners: HashMap<JobId, ConnectionId>,
}

impl Routes {
    fn drop_connection(&mut self, conn: ConnectionId) -> bool {
        let existed = self.connections.remove(&conn).is_some();
        self.owners.retain(|_, owner| *owner != conn);
        existed
    }
}

#[derive(Default)]
pub struct UpdateBroadcaster {
    routes: Mutex<Routes>,
}

impl UpdateBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a delivery channel. The `connection` greeting is already queued
    /// on the returned receiver.
    pub fn register_connection(&self) -> (ConnectionId, UnboundedReceiver<UpdateMessage>) {
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        // Receiver is alive, send cannot fail.
        let _ = tx.send(UpdateMessage::Connection { connection_id: id });
        self.routes.lock().connections.insert(id, tx);
        tracing::debug!(connection_id = %id, "update connection registered");
        (id, rx)
    }

    /// Drops the channel and every ownership pointing at it.
    pub fn unregister_connection(&self, conn: ConnectionId) {
        if self.routes.lock().drop_connection(conn) {
            tracing::debug!(connection_id = %conn, "update connection closed");
        }
    }

    /// Makes `conn` the owner of `job`. Returns false for an unknown connection.
    pub fn bind_owner(&self, job: JobId, conn: ConnectionId) -> bool {
        let mut routes = self.routes.lock();
        if !routes.connections.contains_key(&conn) {
            return false;
        }
        routes.owners.insert(job, conn);
        true
    }

    pub fn release_job(&self, job: JobId) {
        self.routes.lock().owners.remove(&job);
    }

    #[cfg(test)]
    pub(crate) fn owner(&self, job: JobId) -> Option<ConnectionId> {
        self.routes.lock().owners.get(&job).copied()
    }

    pub fn connection_count(&self) -> usize {
        self.routes.lock().connections.len()
    }

    /// Pushes `snapshot` to its job's owner, if any.
    pub fn publish(&self, snapshot: &JobSnapshot) {
        let job = snapshot.job_id;
        let mut guard = self.routes.lock();
        let routes = &mut *guard;
        let Some(conn) = routes.owners.get(&job).copied() else {
            return;
        };
        let Some(tx) = routes.connections.get(&conn) else {
            routes.owners.remove(&job);
            return;
        };
        let message = UpdateMessage::JobUpdate {
            job_id: job,
            data: snapshot.clone(),
        };
        if tx.send(message).is_err() {
            tracing::debug!(
                connection_id = %conn,
                job_id = %job,
                "dropping stale update connection"
            );
            routes.drop_connection(conn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{DownloadMode, JobRegistry};

    #[test]
    fn greeting_is_first_message() {
        let b = UpdateBroadcaster::new();
        let (id, mut rx) = b.register_connection();
        assert_eq!(rx.try_recv().unwrap(), UpdateMessage::Connection { connection_id: id });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn wire_format() {
        let raw = "7f1c2a4e-9b3d-4c5e-8f6a-1b2c3d4e5f60";
        let id: ConnectionId = raw.parse().unwrap();
        let json = serde_json::to_value(UpdateMessage::Connection { connection_id: id }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "connection", "connection_id": raw}));
        let ping: UpdateMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(ping, UpdateMessage::Ping);
        assert_eq!(serde_json::to_string(&UpdateMessage::Pong).unwrap(), r#"{"type":"pong"}"#);
    }

    #[test]
    fn updates_go_only_to_owner() {
        let reg = JobRegistry::new();
        let b = UpdateBroadcaster::new();
        let (owner, mut owner_rx) = b.register_connection();
        let (_other, mut other_rx) = b.register_connection();
        owner_rx.try_recv().unwrap();
        other_rx.try_recv().unwrap();

        let job = reg.create(DownloadMode::Server, None);
        assert!(b.bind_owner(job.job_id, owner));
        b.publish(&job);

        match owner_rx.try_recv().unwrap() {
            UpdateMessage::JobUpdate { job_id, data } => {
                assert_eq!(job_id, job.job_id);
                assert_eq!(data, job);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(other_rx.try_recv().is_err());
    }

    #[test]
    fn publish_without_owner_is_noop() {
        let reg = JobRegistry::new();
        let b = UpdateBroadcaster::new();
        let (_c, mut rx) = b.register_connection();
        rx.try_recv().unwrap();
        b.publish(&reg.create(DownloadMode::Server, None));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn bind_to_unknown_connection_fails() {
        let b = UpdateBroadcaster::new();
        assert!(!b.bind_owner(JobId::new(), ConnectionId::new()));
    }

    #[test]
    fn unregister_drops_ownerships() {
        let b = UpdateBroadcaster::new();
        let (conn, _rx) = b.register_connection();
        let job = JobId::new();
        b.bind_owner(job, conn);
        b.unregister_connection(conn);
        assert_eq!(b.owner(job), None);
        assert_eq!(b.connection_count(), 0);
    }

    #[test]
    fn failed_send_clears_stale_connection() {
        let reg = JobRegistry::new();
        let b = UpdateBroadcaster::new();
        let (conn, rx) = b.register_connection();
        let job = reg.create(DownloadMode::Browser, None);
        b.bind_owner(job.job_id, conn);
        drop(rx);

        b.publish(&job);
        assert_eq!(b.connection_count(), 0);
        assert_eq!(b.owner(job.job_id), None);
    }

    #[test]
    fn release_job_stops_delivery() {
        let reg = JobRegistry::new();
        let b = UpdateBroadcaster::new();
        let (conn, mut rx) = b.register_connection();
        rx.try_recv().unwrap();
        let job = reg.create(DownloadMode::Server, None);
        b.bind_owner(job.job_id, conn);
        b.release_job(job.job_id);
        b.publish(&job);
        assert!(rx.try_recv().is_err());
    }
}
