//! Derives the displayed note list from the selection state.

use serde::{Deserialize, Serialize};

use crate::local_db_model::{Note, ViewMode};
use crate::note_store::search;

/// What the user currently has selected in the sidebar and search bar.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    #[serde(default)]
    pub view_mode: ViewMode,
    #[serde(default)]
    pub selected_tag: Option<String>,
    #[serde(default)]
    pub selected_project: Option<String>,
    #[serde(default)]
    pub search_term: String,
}

impl ViewState {
    /// Selecting the active tag again deselects it. Either way the search is
    /// cleared and the view returns to `all`.
    pub fn select_tag(&mut self, name: &str) {
        if self.selected_tag.as_deref() == Some(name) {
            self.selected_tag = None;
        } else {
            self.selected_tag = Some(name.to_string());
        }
        self.search_term.clear();
        self.view_mode = ViewMode::All;
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        self.search_term.clear();
        self.selected_tag = None;
    }

    pub fn select_project(&mut self, project_id: Option<&str>) {
        self.selected_project = project_id.map(str::to_string);
    }

    pub fn set_search(&mut self, term: &str) {
        self.search_term = term.to_string();
    }
}

fn narrow(notes: Vec<Note>, state: &ViewState) -> Vec<Note> {
    notes
        .into_iter()
        .filter(|n| {
            state
                .selected_project
                .as_deref()
                .map_or(true, |pid| n.project_id == pid)
        })
        .filter(|n| state.view_mode.admits(n))
        .filter(|n| {
            state
                .selected_tag
                .as_deref()
                .map_or(true, |tag| n.tags.iter().any(|t| t == tag))
        })
        .collect()
}

/// Applies project, view-mode and tag narrowing, then the search, then sorts
/// by `updatedAt` descending.
///
/// A non-blank search replaces the narrowed set: it runs over every note and
/// the same narrowing is repeated on its hits.
pub fn filter_notes(all_notes: &[Note], state: &ViewState) -> Vec<Note> {
    let mut filtered = if state.search_term.trim().is_empty() {
        narrow(all_notes.to_vec(), state)
    } else {
        narrow(search(all_notes, &state.search_term), state)
    };
    filtered.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    filtered
}
