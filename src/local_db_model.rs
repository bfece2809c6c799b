//! Entity definitions persisted by the stores.
//!
//! Each entity kind is stored as a JSON array under its own key. Field
//! names are camelCase and timestamps are RFC 3339 strings, so a stored
//! array looks like:
//!
//! ```json
//! [{"id":"…","title":"Groceries","content":"<p>milk</p>","tags":["home"],
//!   "projectId":"…","isFavorite":false,"isArchived":false,
//!   "createdAt":"2024-01-15T10:30:00Z","updatedAt":"2024-01-15T10:30:00Z"}]
//! ```
//!
//! Notes reference tags by **name**, not id. Renaming a tag therefore does
//! not touch the notes that carry the old name, and deleting a project
//! leaves its tags and notes pointing at an id that no longer exists.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::markup::{preview, PREVIEW_LENGTH};

pub type Timestamp = DateTime<Utc>;

pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Current time, strictly after `prev` so every mutation moves `updatedAt`.
pub(crate) fn touch(prev: Timestamp) -> Timestamp {
    let now = Utc::now();
    if now > prev {
        now
    } else {
        prev + Duration::microseconds(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectData {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProjectData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Project {
    pub(crate) fn apply(&mut self, patch: UpdateProjectData) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        self.updated_at = touch(self.updated_at);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
    pub project_id: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagData {
    pub name: String,
    pub color: String,
    pub project_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTagData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl Tag {
    pub(crate) fn apply(&mut self, patch: UpdateTagData) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(project_id) = patch.project_id {
            self.project_id = project_id;
        }
        self.updated_at = touch(self.updated_at);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    /// Rich-text markup as produced by the editor.
    pub content: String,
    /// Tag names in insertion order. Duplicates are allowed.
    pub tags: Vec<String>,
    pub project_id: String,
    pub is_favorite: bool,
    pub is_archived: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteData {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub project_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_archived: Option<bool>,
}

impl From<CreateNoteData> for UpdateNoteData {
    /// The editor saves an existing note with the same payload it uses to
    /// create one.
    fn from(data: CreateNoteData) -> Self {
        Self {
            title: Some(data.title),
            content: Some(data.content),
            tags: Some(data.tags),
            project_id: Some(data.project_id),
            is_favorite: None,
            is_archived: None,
        }
    }
}

impl Note {
    /// Card text: plain content cut to [`PREVIEW_LENGTH`] characters.
    pub fn preview(&self) -> String {
        preview(&self.content, PREVIEW_LENGTH)
    }

    pub(crate) fn apply(&mut self, patch: UpdateNoteData) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(project_id) = patch.project_id {
            self.project_id = project_id;
        }
        if let Some(is_favorite) = patch.is_favorite {
            self.is_favorite = is_favorite;
        }
        if let Some(is_archived) = patch.is_archived {
            self.is_archived = is_archived;
        }
        self.updated_at = touch(self.updated_at);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    All,
    Favorites,
    Archived,
}

impl ViewMode {
    pub fn as_str(self) -> &'static str {
        match self {
            ViewMode::All => "all",
            ViewMode::Favorites => "favorites",
            ViewMode::Archived => "archived",
        }
    }

    /// Whether `note` is eligible for display under this mode.
    pub fn admits(self, note: &Note) -> bool {
        match self {
            ViewMode::All => !note.is_archived,
            ViewMode::Favorites => note.is_favorite && !note.is_archived,
            ViewMode::Archived => note.is_archived,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ViewMode::All => "All Notes",
            ViewMode::Favorites => "Favorite Notes",
            ViewMode::Archived => "Archived Notes",
        }
    }
}
