use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;

use crate::{
    clock::{Clock, SystemClock},
    connection::{Connection, ConnectionKey},
    data::Progress,
    error::Error,
    units::{Bytes, BytesPerSec},
};

type Entry = Arc<Mutex<Connection>>;

#[derive(Debug, Default)]
struct Inner {
    connections: FxHashMap<ConnectionKey, Entry>,
    // Legacy underscore-joined ids, pointing at the most recently created key
    ids: FxHashMap<String, ConnectionKey>,
}

/// The shared store of simulated connections.
///
/// The map lock is only held to insert or to clone out an entry; each connection has its own lock,
/// so updates to one key are serialized without blocking other keys. The clock is read while that
/// lock is held, which keeps segment starts ordered under concurrent updates.
#[derive(derivative::Derivative)]
#[derivative(Debug(bound = ""))]
pub struct Registry<C = SystemClock> {
    #[derivative(Debug = "ignore")]
    clock: C,
    inner: RwLock<Inner>,
}

impl<C: Clock> Registry<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            inner: RwLock::new(Inner::default()),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Registers a connection, replacing any connection already stored under `key`.
    pub fn create(&self, key: ConnectionKey, total: Bytes) {
        let id = key.legacy_id();
        let conn = Arc::new(Mutex::new(Connection::new(key.clone(), total)));
        let mut inner = self.inner.write();
        if inner.connections.insert(key.clone(), conn).is_some() {
            tracing::debug!(connection = %id, "replacing existing connection");
        }
        if let Some(prev) = inner.ids.insert(id.clone(), key.clone()) {
            if prev != key {
                tracing::warn!(
                    id = %id,
                    previous = ?prev,
                    current = ?key,
                    "connection id collision; updates by id now target the newest connection"
                );
            }
        }
        tracing::debug!(connection = %id, total = %total, "connection created");
    }

    fn entry(&self, key: &ConnectionKey) -> Result<Entry, Error> {
        self.inner
            .read()
            .connections
            .get(key)
            .cloned()
            .ok_or_else(|| Error::ConnectionNotFound {
                id: key.legacy_id(),
            })
    }

    fn resolve(&self, id: &str) -> Result<ConnectionKey, Error> {
        self.inner
            .read()
            .ids
            .get(id)
            .cloned()
            .ok_or_else(|| Error::ConnectionNotFound { id: id.to_owned() })
    }

    /// Runs `f` on the connection stored under `key` while holding its lock.
    pub fn with_connection<T>(
        &self,
        key: &ConnectionKey,
        f: impl FnOnce(&Connection) -> T,
    ) -> Result<T, Error> {
        let entry = self.entry(key)?;
        let conn = entry.lock();
        Ok(f(&conn))
    }

    /// Returns a copy of the connection stored under `key`.
    pub fn lookup(&self, key: &ConnectionKey) -> Result<Connection, Error> {
        self.with_connection(key, Connection::clone)
    }

    /// Starts a new bandwidth segment on the connection stored under `key`.
    pub fn update(&self, key: &ConnectionKey, bandwidth: BytesPerSec) -> Result<(), Error> {
        let entry = self.entry(key)?;
        let mut conn = entry.lock();
        let now = self.clock.now();
        conn.update(bandwidth, now);
        tracing::debug!(
            connection = %conn.key(),
            bandwidth = %bandwidth,
            segments = conn.segments().len(),
            "connection updated"
        );
        Ok(())
    }

    /// Like [`Registry::update`], addressing the connection by its underscore-joined id.
    pub fn update_by_id(&self, id: &str, bandwidth: BytesPerSec) -> Result<(), Error> {
        let key = self.resolve(id)?;
        self.update(&key, bandwidth)
    }

    pub fn is_finished(&self, key: &ConnectionKey) -> Result<bool, Error> {
        self.with_connection(key, |conn| conn.is_finished(self.clock.now()))?
    }

    pub fn progress(&self, key: &ConnectionKey) -> Result<Progress, Error> {
        self.with_connection(key, |conn| conn.progress(self.clock.now()))?
    }

    pub fn len(&self) -> usize {
        self.inner.read().connections.len()
    }
}

impl Default for Registry<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock::default())
    }
}
