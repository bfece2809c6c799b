//! Note CRUD, favourite/archive toggles and full-text search.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, info};

use crate::local_db_model::{new_id, CreateNoteData, Note, UpdateNoteData, ViewMode};
use crate::markup::strip_markup;
use crate::storage::{KeyValueStore, Persisted};

pub struct NoteStore {
    notes: Persisted<Vec<Note>>,
}

impl NoteStore {
    pub fn open(store: Arc<KeyValueStore>, key: &str) -> Self {
        let notes = Persisted::load(store, key, Vec::new());
        debug!("Loaded {} notes from '{}'", notes.read(Vec::len), key);
        Self { notes }
    }

    pub fn notes(&self) -> Vec<Note> {
        self.notes.get()
    }

    pub fn create_note(&self, data: CreateNoteData) -> Note {
        let now = Utc::now();
        let note = Note {
            id: new_id(),
            title: data.title,
            content: data.content,
            tags: data.tags,
            project_id: data.project_id,
            is_favorite: false,
            is_archived: false,
            created_at: now,
            updated_at: now,
        };
        self.notes.update(|notes| notes.push(note.clone()));
        info!("Created note {} in project {}", note.id, note.project_id);
        note
    }

    pub fn update_note(&self, id: &str, patch: UpdateNoteData) -> Option<Note> {
        if !self.notes.read(|notes| notes.iter().any(|n| n.id == id)) {
            debug!("update_note: no note with id {id}");
            return None;
        }
        self.notes.update(|notes| {
            let note = notes.iter_mut().find(|n| n.id == id)?;
            note.apply(patch);
            Some(note.clone())
        })
    }

    pub fn delete_note(&self, id: &str) -> bool {
        self.notes.update(|notes| notes.retain(|n| n.id != id));
        info!("Deleted note {id}");
        true
    }

    pub fn get_note_by_id(&self, id: &str) -> Option<Note> {
        self.notes.read(|notes| notes.iter().find(|n| n.id == id).cloned())
    }

    /// Notes whose title, plain-text content or any tag name contains `term`,
    /// case-insensitively. A blank term returns every note in store order.
    pub fn search_notes(&self, term: &str) -> Vec<Note> {
        self.notes.read(|notes| search(notes, term))
    }

    pub fn get_favorite_notes(&self) -> Vec<Note> {
        self.in_view(ViewMode::Favorites)
    }

    pub fn get_archived_notes(&self) -> Vec<Note> {
        self.in_view(ViewMode::Archived)
    }

    pub fn get_active_notes(&self) -> Vec<Note> {
        self.in_view(ViewMode::All)
    }

    fn in_view(&self, mode: ViewMode) -> Vec<Note> {
        self.notes
            .read(|notes| notes.iter().filter(|n| mode.admits(n)).cloned().collect())
    }

    pub fn toggle_favorite(&self, id: &str) -> Option<Note> {
        let current = self.get_note_by_id(id)?;
        self.update_note(
            id,
            UpdateNoteData {
                is_favorite: Some(!current.is_favorite),
                ..Default::default()
            },
        )
    }

    pub fn toggle_archive(&self, id: &str) -> Option<Note> {
        let current = self.get_note_by_id(id)?;
        self.update_note(
            id,
            UpdateNoteData {
                is_archived: Some(!current.is_archived),
                ..Default::default()
            },
        )
    }

    /// Every tag name carried by any note, with repeats, for usage ranking.
    pub fn all_tag_names(&self) -> Vec<String> {
        self.notes
            .read(|notes| notes.iter().flat_map(|n| n.tags.iter().cloned()).collect())
    }
}

pub(crate) fn search(notes: &[Note], term: &str) -> Vec<Note> {
    if term.trim().is_empty() {
        return notes.to_vec();
    }
    let term = term.to_lowercase();
    notes
        .iter()
        .filter(|note| matches_term(note, &term))
        .cloned()
        .collect()
}

/// `term` must already be lowercase.
fn matches_term(note: &Note, term: &str) -> bool {
    note.title.to_lowercase().contains(term)
        || strip_markup(&note.content).to_lowercase().contains(term)
        || note.tags.iter().any(|tag| tag.to_lowercase().contains(term))
}
