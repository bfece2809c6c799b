//! Project CRUD, name lookup and colour assignment.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, info};

use crate::local_db_model::{new_id, CreateProjectData, Project, UpdateProjectData};
use crate::palette::{pick_color, PROJECT_COLORS};
use crate::storage::{KeyValueStore, Persisted};

pub struct ProjectStore {
    projects: Persisted<Vec<Project>>,
}

impl ProjectStore {
    pub fn open(store: Arc<KeyValueStore>, key: &str) -> Self {
        let projects = Persisted::load(store, key, Vec::new());
        debug!("Loaded {} projects from '{}'", projects.read(Vec::len), key);
        Self { projects }
    }

    pub fn projects(&self) -> Vec<Project> {
        self.projects.get()
    }

    /// Appends a new project. Does not check name uniqueness; call
    /// [`ProjectStore::project_exists`] first.
    pub fn create_project(&self, data: CreateProjectData) -> Project {
        let now = Utc::now();
        let project = Project {
            id: new_id(),
            name: data.name.trim().to_string(),
            description: data.description.trim().to_string(),
            color: data.color,
            created_at: now,
            updated_at: now,
        };
        self.projects.update(|projects| projects.push(project.clone()));
        info!("Created project {} ({})", project.id, project.name);
        project
    }

    pub fn update_project(&self, id: &str, patch: UpdateProjectData) -> Option<Project> {
        if !self.projects.read(|projects| projects.iter().any(|p| p.id == id)) {
            return None;
        }
        let updated = self.projects.update(|projects| {
            let project = projects.iter_mut().find(|p| p.id == id)?;
            project.apply(patch);
            Some(project.clone())
        });
        if updated.is_some() {
            debug!("Updated project {id}");
        }
        updated
    }

    /// Removes the project only. Tags and notes that reference it keep the
    /// now dangling `projectId`.
    pub fn delete_project(&self, id: &str) -> bool {
        self.projects.update(|projects| projects.retain(|p| p.id != id));
        info!("Deleted project {id}");
        true
    }

    pub fn get_project_by_id(&self, id: &str) -> Option<Project> {
        self.projects
            .read(|projects| projects.iter().find(|p| p.id == id).cloned())
    }

    pub fn get_project_by_name(&self, name: &str) -> Option<Project> {
        let wanted = name.to_lowercase();
        self.projects.read(|projects| {
            projects
                .iter()
                .find(|p| p.name.to_lowercase() == wanted)
                .cloned()
        })
    }

    /// Case-insensitive exact name match.
    pub fn project_exists(&self, name: &str) -> bool {
        self.get_project_by_name(name).is_some()
    }

    pub fn get_random_color(&self) -> String {
        self.projects.read(|projects| {
            pick_color(&PROJECT_COLORS, projects.iter().map(|p| p.color.as_str()))
        })
    }
}
