//! In-process substitute for the durable store. Nothing survives a restart.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::app_response::AppResponse;
use crate::storage::StorageBackend;

#[derive(Default)]
pub struct MemoryDbState {
    items: Mutex<BTreeMap<String, String>>,
}

impl MemoryDbState {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryDbState {
    fn get_item(&self, key: &str) -> Result<Option<String>, AppResponse> {
        let items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), AppResponse> {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), AppResponse> {
        let mut items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        items.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, AppResponse> {
        let items = self.items.lock().unwrap_or_else(|e| e.into_inner());
        Ok(items.keys().cloned().collect())
    }

    fn clear(&self) -> Result<(), AppResponse> {
        self.items.lock().unwrap_or_else(|e| e.into_inner()).clear();
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }
}
