use serde::{Deserialize, Serialize};

use crate::app_response::AppResponse;
use crate::local_db_state::DEFAULT_MAP_SIZE;

pub const DEFAULT_NAMESPACE: &str = "notes-mentor";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotebookConfig {
    /// LMDB location without the `.lmdb` suffix. `None` keeps everything in
    /// memory.
    pub storage_path: Option<String>,
    /// Prefix of the three storage keys.
    pub namespace: String,
    pub map_size: usize,
}

impl Default for NotebookConfig {
    fn default() -> Self {
        Self {
            storage_path: None,
            namespace: DEFAULT_NAMESPACE.to_string(),
            map_size: DEFAULT_MAP_SIZE,
        }
    }
}

impl NotebookConfig {
    pub fn at_path(path: impl Into<String>) -> Self {
        Self {
            storage_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, AppResponse> {
        let config: Self = serde_json::from_str(json)?;
        if config.namespace.trim().is_empty() {
            return Err(AppResponse::ValidationError(
                "namespace must not be empty".to_string(),
            ));
        }
        Ok(config)
    }

    pub fn projects_key(&self) -> String {
        format!("{}-projects", self.namespace)
    }

    pub fn tags_key(&self) -> String {
        format!("{}-tags", self.namespace)
    }

    pub fn notes_key(&self) -> String {
        format!("{}-notes", self.namespace)
    }
}
