//! Key-value store adapter.
//!
//! Three layers sit between a store and the bytes on disk:
//!
//! - [`StorageBackend`]: the raw string-keyed store ([`AppDbState`] on LMDB,
//!   [`MemoryDbState`] as the fallback).
//! - [`SharedStorage`]: one backend plus a change feed. It probes the durable
//!   backend once and swaps in memory storage if the probe fails.
//! - [`KeyValueStore`]: one session on a `SharedStorage`, with its own mirror
//!   of the values it has seen. Writes made by *other* sessions arrive as
//!   [`StorageEvent`]s and overwrite the mirror (last writer wins).
//!
//! [`Persisted`] is the typed accessor the entity stores are built on.
//!
//! [`AppDbState`]: crate::local_db_state::AppDbState
//! [`MemoryDbState`]: crate::memory_state::MemoryDbState

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::app_response::AppResponse;
use crate::memory_state::MemoryDbState;

const PROBE_KEY: &str = "__storage_probe__";

pub trait StorageBackend: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppResponse>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), AppResponse>;
    fn remove_item(&self, key: &str) -> Result<(), AppResponse>;
    fn keys(&self) -> Result<Vec<String>, AppResponse>;
    fn clear(&self) -> Result<(), AppResponse>;
    fn is_durable(&self) -> bool;
}

/// A write observed on the shared store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    /// `None` when the key was removed.
    pub new_value: Option<String>,
    /// Session id of the writer.
    pub origin: u64,
}

type Listener = Arc<dyn Fn(&StorageEvent) + Send + Sync>;

#[derive(Default)]
pub struct ChangeFeed {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

impl ChangeFeed {
    pub fn subscribe(
        self: &Arc<Self>,
        listener: impl Fn(&StorageEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let listener: Listener = Arc::new(listener);
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, listener));
        Subscription {
            feed: Arc::downgrade(self),
            id,
        }
    }

    pub fn publish(&self, event: &StorageEvent) {
        // Snapshot first so listeners can take their own locks freely.
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    fn unsubscribe(&self, id: u64) {
        self.listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .retain(|(lid, _)| *lid != id);
    }
}

/// Unregisters its listener on drop.
pub struct Subscription {
    feed: Weak<ChangeFeed>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(feed) = self.feed.upgrade() {
            feed.unsubscribe(self.id);
        }
    }
}

#[derive(Clone)]
pub struct SharedStorage {
    backend: Arc<dyn StorageBackend>,
    feed: Arc<ChangeFeed>,
    next_session: Arc<AtomicU64>,
}

impl SharedStorage {
    /// Probes `durable` and falls back to memory storage if it is unusable.
    pub fn new(durable: Arc<dyn StorageBackend>) -> Self {
        let backend: Arc<dyn StorageBackend> = match probe(durable.as_ref()) {
            Ok(()) => {
                info!("Durable storage available");
                durable
            }
            Err(e) => {
                warn!("Durable storage unavailable, using in-memory storage for this session: {e}");
                Arc::new(MemoryDbState::new())
            }
        };
        Self::with_backend(backend)
    }

    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(MemoryDbState::new()))
    }

    fn with_backend(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            backend,
            feed: Arc::new(ChangeFeed::default()),
            next_session: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn is_durable(&self) -> bool {
        self.backend.is_durable()
    }

    pub fn backend(&self) -> &Arc<dyn StorageBackend> {
        &self.backend
    }

    /// Opens a new session, the equivalent of another tab on the same store.
    pub fn session(&self) -> KeyValueStore {
        KeyValueStore::open(self)
    }
}

fn probe(backend: &dyn StorageBackend) -> Result<(), AppResponse> {
    backend.set_item(PROBE_KEY, PROBE_KEY)?;
    let read_back = backend.get_item(PROBE_KEY)?;
    backend.remove_item(PROBE_KEY)?;
    if read_back.as_deref() == Some(PROBE_KEY) {
        Ok(())
    } else {
        Err(AppResponse::DatabaseError(
            "Probe value did not read back".to_string(),
        ))
    }
}

struct SessionInner {
    mirror: Mutex<HashMap<String, String>>,
    watchers: Arc<ChangeFeed>,
}

pub struct KeyValueStore {
    id: u64,
    backend: Arc<dyn StorageBackend>,
    feed: Arc<ChangeFeed>,
    inner: Arc<SessionInner>,
    _bridge: Subscription,
}

impl KeyValueStore {
    fn open(shared: &SharedStorage) -> Self {
        let id = shared.next_session.fetch_add(1, Ordering::Relaxed);
        let inner = Arc::new(SessionInner {
            mirror: Mutex::new(HashMap::new()),
            watchers: Arc::new(ChangeFeed::default()),
        });

        let weak: Weak<SessionInner> = Arc::downgrade(&inner);
        let bridge = shared.feed.subscribe(move |event| {
            if event.origin == id {
                return;
            }
            let Some(inner) = weak.upgrade() else {
                return;
            };
            {
                let mut mirror = inner.mirror.lock().unwrap_or_else(|e| e.into_inner());
                match &event.new_value {
                    Some(value) => {
                        mirror.insert(event.key.clone(), value.clone());
                    }
                    None => {
                        mirror.remove(&event.key);
                    }
                }
            }
            debug!("Session {} observed external change to '{}'", id, event.key);
            inner.watchers.publish(event);
        });

        Self {
            id,
            backend: Arc::clone(&shared.backend),
            feed: Arc::clone(&shared.feed),
            inner,
            _bridge: bridge,
        }
    }

    pub fn session_id(&self) -> u64 {
        self.id
    }

    pub fn read_raw(&self, key: &str) -> Option<String> {
        if let Some(value) = self.lock_mirror().get(key) {
            return Some(value.clone());
        }
        match self.backend.get_item(key) {
            Ok(Some(value)) => {
                self.lock_mirror().insert(key.to_string(), value.clone());
                Some(value)
            }
            Ok(None) => None,
            Err(e) => {
                error!("Error reading storage key \"{key}\": {e}");
                None
            }
        }
    }

    /// Reads and deserialises `key`, returning `default` when it is missing
    /// or does not parse.
    pub fn read<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.read_raw(key) {
            Some(json) => match serde_json::from_str(&json) {
                Ok(value) => value,
                Err(e) => {
                    error!("Error parsing storage key \"{key}\": {e}");
                    default
                }
            },
            None => default,
        }
    }

    /// Serialises and persists `value`. Failures are logged; the mirror is
    /// updated regardless so the session stays consistent.
    pub fn write<T: Serialize>(&self, key: &str, value: &T) {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                error!("Error serializing storage key \"{key}\": {e}");
                return;
            }
        };
        self.write_raw(key, json);
    }

    pub fn write_raw(&self, key: &str, json: String) {
        self.lock_mirror().insert(key.to_string(), json.clone());
        if let Err(e) = self.backend.set_item(key, &json) {
            error!("Error saving storage key \"{key}\": {e}");
        }
        self.feed.publish(&StorageEvent {
            key: key.to_string(),
            new_value: Some(json),
            origin: self.id,
        });
    }

    pub fn remove(&self, key: &str) {
        self.lock_mirror().remove(key);
        if let Err(e) = self.backend.remove_item(key) {
            error!("Error removing storage key \"{key}\": {e}");
        }
        self.feed.publish(&StorageEvent {
            key: key.to_string(),
            new_value: None,
            origin: self.id,
        });
    }

    /// Calls `listener` for every external change to `key`.
    pub fn watch(
        &self,
        key: &str,
        listener: impl Fn(&StorageEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let key = key.to_string();
        self.inner.watchers.subscribe(move |event| {
            if event.key == key {
                listener(event);
            }
        })
    }

    fn lock_mirror(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.inner.mirror.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A typed value stored as JSON under one key.
///
/// The value is loaded once, written through after each mutation, and
/// replaced wholesale when another session writes the same key.
pub struct Persisted<T> {
    key: String,
    value: Arc<Mutex<T>>,
    store: Arc<KeyValueStore>,
    _watch: Subscription,
}

impl<T> Persisted<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + 'static,
{
    pub fn load(store: Arc<KeyValueStore>, key: &str, default: T) -> Self {
        let value = Arc::new(Mutex::new(store.read(key, default)));

        let target = Arc::clone(&value);
        let watched_key = key.to_string();
        let watch = store.watch(key, move |event| {
            let Some(json) = &event.new_value else {
                return;
            };
            match serde_json::from_str::<T>(json) {
                Ok(next) => {
                    *target.lock().unwrap_or_else(|e| e.into_inner()) = next;
                    debug!("Reloaded \"{watched_key}\" from external change");
                }
                Err(e) => error!("Error syncing storage key \"{watched_key}\": {e}"),
            }
        });

        Self {
            key: key.to_string(),
            value,
            store,
            _watch: watch,
        }
    }

    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.value.lock().unwrap_or_else(|e| e.into_inner());
        f(&*guard)
    }

    pub fn get(&self) -> T {
        self.read(T::clone)
    }

    /// Mutates in place and persists the result. The lock is released
    /// before the write so cross-session listeners never nest.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let (result, snapshot) = {
            let mut guard = self.value.lock().unwrap_or_else(|e| e.into_inner());
            let result = f(&mut *guard);
            (result, guard.clone())
        };
        self.store.write(&self.key, &snapshot);
        result
    }
}
