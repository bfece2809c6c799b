//! LMDB-backed durable store.
//!
//! [`AppDbState`] is the durable half of the key-value layer: a single named
//! LMDB database holding UTF-8 JSON strings under string keys. It knows
//! nothing about notes or projects; the typed view lives in
//! [`crate::storage`].

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use lmdb::{Cursor, Database, DatabaseFlags, Environment, Transaction, WriteFlags};
use log::{debug, info, warn};

use crate::app_response::AppResponse;
use crate::storage::StorageBackend;

const DB_NAME: &str = "kv";
pub const DEFAULT_MAP_SIZE: usize = 10 * 1024 * 1024;

struct LmdbHandle {
    env: Environment,
    db: Database,
}

pub struct AppDbState {
    path: PathBuf,
    handle: RwLock<Option<LmdbHandle>>,
}

impl AppDbState {
    /// Opens (or creates) the environment at `<name>.lmdb`.
    pub fn init(name: String) -> Result<Self, AppResponse> {
        Self::init_with_map_size(name, DEFAULT_MAP_SIZE)
    }

    pub fn init_with_map_size(name: String, map_size: usize) -> Result<Self, AppResponse> {
        let path = PathBuf::from(format!("{name}.lmdb"));
        info!("Opening LMDB environment at: {}", path.display());

        fs::create_dir_all(&path).map_err(|e| {
            AppResponse::DatabaseError(format!("Cannot create {}: {e}", path.display()))
        })?;

        let env = Environment::new()
            .set_max_dbs(1)
            .set_map_size(map_size)
            .open(&path)?;
        let db = env.create_db(Some(DB_NAME), DatabaseFlags::empty())?;

        Ok(Self {
            path,
            handle: RwLock::new(Some(LmdbHandle { env, db })),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_handle<R>(
        &self,
        op: &str,
        f: impl FnOnce(&LmdbHandle) -> Result<R, AppResponse>,
    ) -> Result<R, AppResponse> {
        let guard = self.handle.read().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(handle) => f(handle),
            None => Err(AppResponse::DatabaseError(format!(
                "{op} called on closed database {}",
                self.path.display()
            ))),
        }
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>, AppResponse> {
        self.with_handle("get_item", |h| {
            let txn = h.env.begin_ro_txn()?;
            let value = match txn.get(h.db, &key) {
                Ok(bytes) => Some(String::from_utf8(bytes.to_vec()).map_err(|e| {
                    AppResponse::SerializationError(format!("Invalid UTF-8 under '{key}': {e}"))
                })?),
                Err(lmdb::Error::NotFound) => None,
                Err(e) => return Err(e.into()),
            };
            txn.abort();
            Ok(value)
        })
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        self.with_handle("set_item", |h| {
            let mut txn = h.env.begin_rw_txn()?;
            txn.put(h.db, &key, &value, WriteFlags::empty())?;
            txn.commit()?;
            debug!("Stored {} bytes under '{}'", value.len(), key);
            Ok(())
        })
    }

    pub fn remove_item(&self, key: &str) -> Result<bool, AppResponse> {
        self.with_handle("remove_item", |h| {
            let mut txn = h.env.begin_rw_txn()?;
            let removed = match txn.del(h.db, &key, None) {
                Ok(()) => true,
                Err(lmdb::Error::NotFound) => false,
                Err(e) => return Err(e.into()),
            };
            txn.commit()?;
            Ok(removed)
        })
    }

    pub fn keys(&self) -> Result<Vec<String>, AppResponse> {
        self.with_handle("keys", |h| {
            let txn = h.env.begin_ro_txn()?;
            let mut keys = Vec::new();
            {
                // iter_start() unwraps MDB_FIRST and panics on an empty db.
                let mut cursor = txn.open_ro_cursor(h.db)?;
                for (key, _) in cursor.iter() {
                    keys.push(String::from_utf8_lossy(key).into_owned());
                }
            }
            txn.abort();
            Ok(keys)
        })
    }

    pub fn clear_all_records(&self) -> Result<(), AppResponse> {
        self.with_handle("clear_all_records", |h| {
            let mut txn = h.env.begin_rw_txn()?;
            txn.clear_db(h.db)?;
            txn.commit()?;
            info!("Cleared all records in {}", self.path.display());
            Ok(())
        })
    }

    /// Drops the environment; later calls fail with `DatabaseError`.
    pub fn close_database(&self) -> Result<(), AppResponse> {
        let mut guard = self.handle.write().unwrap_or_else(|e| e.into_inner());
        match guard.take() {
            Some(handle) => {
                if let Err(e) = handle.env.sync(true) {
                    warn!("Failed to sync {} before close: {e}", self.path.display());
                }
                info!("LMDB environment {} closed", self.path.display());
                Ok(())
            }
            None => {
                warn!("close_database called twice on {}", self.path.display());
                Ok(())
            }
        }
    }
}

impl StorageBackend for AppDbState {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppResponse> {
        AppDbState::get_item(self, key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        AppDbState::set_item(self, key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), AppResponse> {
        AppDbState::remove_item(self, key).map(|_| ())
    }

    fn keys(&self) -> Result<Vec<String>, AppResponse> {
        AppDbState::keys(self)
    }

    fn clear(&self) -> Result<(), AppResponse> {
        self.clear_all_records()
    }

    fn is_durable(&self) -> bool {
        true
    }
}
