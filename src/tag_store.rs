//! Tag CRUD, project-scoped uniqueness, usage ranking and colour assignment.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use log::{debug, info};

use crate::local_db_model::{new_id, CreateTagData, Tag, UpdateTagData};
use crate::palette::{pick_color, FALLBACK_TAG_COLOR, TAG_COLORS};
use crate::storage::{KeyValueStore, Persisted};

pub const MAX_TAG_SUGGESTIONS: usize = 5;

pub struct TagStore {
    tags: Persisted<Vec<Tag>>,
}

impl TagStore {
    pub fn open(store: Arc<KeyValueStore>, key: &str) -> Self {
        let tags = Persisted::load(store, key, Vec::new());
        debug!("Loaded {} tags from '{}'", tags.read(Vec::len), key);
        Self { tags }
    }

    pub fn tags(&self) -> Vec<Tag> {
        self.tags.get()
    }

    pub fn tags_for_project(&self, project_id: &str) -> Vec<Tag> {
        self.tags.read(|tags| {
            tags.iter()
                .filter(|t| t.project_id == project_id)
                .cloned()
                .collect()
        })
    }

    /// Appends a new tag. Does not check uniqueness; call
    /// [`TagStore::tag_exists`] first.
    pub fn create_tag(&self, data: CreateTagData) -> Tag {
        let now = Utc::now();
        let tag = Tag {
            id: new_id(),
            name: data.name.trim().to_string(),
            color: data.color,
            project_id: data.project_id,
            created_at: now,
            updated_at: now,
        };
        self.tags.update(|tags| tags.push(tag.clone()));
        info!(
            "Created tag {} ({}) in project {}",
            tag.id, tag.name, tag.project_id
        );
        tag
    }

    /// Renaming does not rewrite notes that carry the old name.
    pub fn update_tag(&self, id: &str, patch: UpdateTagData) -> Option<Tag> {
        if !self.tags.read(|tags| tags.iter().any(|t| t.id == id)) {
            return None;
        }
        self.tags.update(|tags| {
            let tag = tags.iter_mut().find(|t| t.id == id)?;
            tag.apply(patch);
            Some(tag.clone())
        })
    }

    pub fn delete_tag(&self, id: &str) -> bool {
        self.tags.update(|tags| tags.retain(|t| t.id != id));
        info!("Deleted tag {id}");
        true
    }

    pub fn get_tag_by_id(&self, id: &str) -> Option<Tag> {
        self.tags.read(|tags| tags.iter().find(|t| t.id == id).cloned())
    }

    /// First tag with this name in any project, case-insensitive.
    pub fn get_tag_by_name(&self, name: &str) -> Option<Tag> {
        let wanted = name.to_lowercase();
        self.tags
            .read(|tags| tags.iter().find(|t| t.name.to_lowercase() == wanted).cloned())
    }

    /// Case-insensitive name match, scoped to `project_id` when given.
    pub fn tag_exists(&self, name: &str, project_id: Option<&str>) -> bool {
        let wanted = name.to_lowercase();
        self.tags.read(|tags| {
            tags.iter().any(|t| {
                t.name.to_lowercase() == wanted
                    && project_id.map_or(true, |pid| t.project_id == pid)
            })
        })
    }

    /// Known tags whose name occurs in `note_tag_names`, most frequent first.
    /// Ties keep store order.
    pub fn most_used_tags<S: AsRef<str>>(&self, note_tag_names: &[S]) -> Vec<Tag> {
        let mut usage: HashMap<&str, usize> = HashMap::new();
        for name in note_tag_names {
            *usage.entry(name.as_ref()).or_insert(0) += 1;
        }

        let mut used: Vec<Tag> = self.tags.read(|tags| {
            tags.iter()
                .filter(|t| usage.contains_key(t.name.as_str()))
                .cloned()
                .collect()
        });
        // sort_by_key is stable.
        used.sort_by_key(|t| {
            std::cmp::Reverse(usage.get(t.name.as_str()).copied().unwrap_or(0))
        });
        used
    }

    /// Editor autocomplete: tags containing `input`, minus those already
    /// selected, limited to the note's project when one is chosen.
    pub fn suggest_tags(
        &self,
        input: &str,
        selected: &[String],
        project_id: Option<&str>,
    ) -> Vec<Tag> {
        let needle = input.to_lowercase();
        self.tags.read(|tags| {
            tags.iter()
                .filter(|t| t.name.to_lowercase().contains(&needle))
                .filter(|t| !selected.contains(&t.name))
                .filter(|t| project_id.map_or(true, |pid| t.project_id == pid))
                .take(MAX_TAG_SUGGESTIONS)
                .cloned()
                .collect()
        })
    }

    pub fn tag_color(&self, name: &str) -> String {
        self.get_tag_by_name(name)
            .map(|t| t.color)
            .unwrap_or_else(|| FALLBACK_TAG_COLOR.to_string())
    }

    pub fn get_random_color(&self) -> String {
        self.tags
            .read(|tags| pick_color(&TAG_COLORS, tags.iter().map(|t| t.color.as_str())))
    }
}
