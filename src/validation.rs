//! Form-level checks the editor runs before calling a store.
//!
//! Stores never call these; uniqueness is checked separately through
//! `project_exists` / `tag_exists`.

use crate::app_response::AppResponse;
use crate::markup::has_text;

pub const PROJECT_NAME_MAX: usize = 30;
pub const PROJECT_DESCRIPTION_MAX: usize = 100;
pub const TAG_NAME_MAX: usize = 20;

fn invalid(msg: impl Into<String>) -> Result<(), AppResponse> {
    Err(AppResponse::ValidationError(msg.into()))
}

pub fn validate_project(name: &str, description: &str) -> Result<(), AppResponse> {
    let name = name.trim();
    if name.is_empty() {
        return invalid("Project name is required");
    }
    if name.chars().count() > PROJECT_NAME_MAX {
        return invalid(format!("Project name exceeds {PROJECT_NAME_MAX} characters"));
    }
    if description.trim().chars().count() > PROJECT_DESCRIPTION_MAX {
        return invalid(format!(
            "Project description exceeds {PROJECT_DESCRIPTION_MAX} characters"
        ));
    }
    Ok(())
}

pub fn validate_tag(name: &str, project_id: &str) -> Result<(), AppResponse> {
    let name = name.trim();
    if name.is_empty() {
        return invalid("Tag name is required");
    }
    if name.chars().count() > TAG_NAME_MAX {
        return invalid(format!("Tag name exceeds {TAG_NAME_MAX} characters"));
    }
    if project_id.is_empty() {
        return invalid("Select a project");
    }
    Ok(())
}

pub fn validate_note(title: &str, content: &str, project_id: &str) -> Result<(), AppResponse> {
    if title.trim().is_empty() || !has_text(content) {
        return invalid("Title and content are required");
    }
    if project_id.is_empty() {
        return invalid("Select a project");
    }
    Ok(())
}
