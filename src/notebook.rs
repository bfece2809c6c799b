//! The data layer as one explicit object: a storage session plus the three
//! entity stores, constructed once and handed to whatever owns UI state.

use std::sync::Arc;

use log::{info, warn};

use crate::config::NotebookConfig;
use crate::local_db_model::{Note, Tag};
use crate::local_db_state::AppDbState;
use crate::note_filter::{filter_notes, ViewState};
use crate::note_store::NoteStore;
use crate::project_store::ProjectStore;
use crate::storage::{KeyValueStore, SharedStorage};
use crate::tag_store::TagStore;

pub struct Notebook {
    shared: SharedStorage,
    session: Arc<KeyValueStore>,
    projects: ProjectStore,
    tags: TagStore,
    notes: NoteStore,
}

impl Notebook {
    /// Opens the configured durable store, falling back to memory storage
    /// when there is no path or LMDB cannot be opened.
    pub fn open(config: &NotebookConfig) -> Self {
        let shared = match &config.storage_path {
            Some(path) => match AppDbState::init_with_map_size(path.clone(), config.map_size) {
                Ok(db) => SharedStorage::new(Arc::new(db)),
                Err(e) => {
                    warn!("Could not open LMDB at {path}: {e}; notes will not persist");
                    SharedStorage::in_memory()
                }
            },
            None => {
                info!("No storage path configured; using in-memory storage");
                SharedStorage::in_memory()
            }
        };
        Self::attach(&shared, config)
    }

    /// Opens another session on `shared`. Writes made through one session
    /// replace the other session's data for the same key.
    pub fn attach(shared: &SharedStorage, config: &NotebookConfig) -> Self {
        let session = Arc::new(shared.session());
        Self {
            shared: shared.clone(),
            projects: ProjectStore::open(Arc::clone(&session), &config.projects_key()),
            tags: TagStore::open(Arc::clone(&session), &config.tags_key()),
            notes: NoteStore::open(Arc::clone(&session), &config.notes_key()),
            session,
        }
    }

    pub fn shared(&self) -> &SharedStorage {
        &self.shared
    }

    pub fn session(&self) -> &KeyValueStore {
        &self.session
    }

    pub fn is_durable(&self) -> bool {
        self.shared.is_durable()
    }

    pub fn projects(&self) -> &ProjectStore {
        &self.projects
    }

    pub fn tags(&self) -> &TagStore {
        &self.tags
    }

    pub fn notes(&self) -> &NoteStore {
        &self.notes
    }

    pub fn filtered_notes(&self, state: &ViewState) -> Vec<Note> {
        filter_notes(&self.notes.notes(), state)
    }

    /// Known tags ranked by how many notes carry them.
    pub fn most_used_tags(&self) -> Vec<Tag> {
        self.tags.most_used_tags(&self.notes.all_tag_names())
    }

    /// Heading for the note list under the current selection.
    pub fn view_title(&self, state: &ViewState) -> String {
        if let Some(project_id) = &state.selected_project {
            let project_name = self
                .projects
                .get_project_by_id(project_id)
                .map(|p| p.name)
                .unwrap_or_else(|| "Project".to_string());
            return match &state.selected_tag {
                Some(tag) => format!("{project_name}: {tag}"),
                None => project_name,
            };
        }
        if let Some(tag) = &state.selected_tag {
            return format!("Tag: {tag}");
        }
        state.view_mode.title().to_string()
    }
}
