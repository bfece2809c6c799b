//! # Notebook Core
//!
//! Data layer of a personal notes application. Notes are grouped into
//! projects, labelled with project-scoped tags, favourited, archived and
//! searched. Everything is persisted as three JSON arrays in a local
//! key-value store backed by LMDB, with an in-memory fallback when LMDB is
//! unavailable.
//!
//! ## Layout
//!
//! - [`storage`]: key-value adapter, sessions and cross-session change feed
//! - [`local_db_state`]: LMDB durable store; [`memory_state`]: fallback
//! - [`project_store`], [`tag_store`], [`note_store`]: entity stores
//! - [`note_filter`]: the filtered, sorted note list for the current view
//! - [`notebook`]: the object that ties a session and the stores together
//!
//! ## Quick Start
//!
//! ```no_run
//! use notebook_core::config::NotebookConfig;
//! use notebook_core::local_db_model::{CreateNoteData, CreateProjectData};
//! use notebook_core::note_filter::ViewState;
//! use notebook_core::notebook::Notebook;
//!
//! let notebook = Notebook::open(&NotebookConfig::at_path("my_notes"));
//!
//! let color = notebook.projects().get_random_color();
//! let work = notebook.projects().create_project(CreateProjectData {
//!     name: "Work".to_string(),
//!     description: String::new(),
//!     color,
//! });
//!
//! notebook.notes().create_note(CreateNoteData {
//!     title: "Standup".to_string(),
//!     content: "<p>Ship the release</p>".to_string(),
//!     tags: vec!["daily".to_string()],
//!     project_id: work.id.clone(),
//! });
//!
//! let visible = notebook.filtered_notes(&ViewState::default());
//! assert_eq!(visible.len(), 1);
//! ```
//!
//! ## FFI Functions
//!
//! Every exported function returns a JSON-encoded [`AppResponse`] C string
//! (free it with [`free_c_string`]), except [`open_notebook`], which returns
//! the handle itself.
//!
//! - Lifecycle: [`open_notebook`], [`close_notebook`], [`free_c_string`]
//! - Projects: [`projects_all`], [`project_by_id`], [`project_create`],
//!   [`project_update`], [`project_delete`], [`project_exists`],
//!   [`random_project_color`]
//! - Tags: [`tags_all`], [`tags_for_project`], [`tag_by_id`], [`tag_create`],
//!   [`tag_update`], [`tag_delete`], [`tag_exists`], [`tags_most_used`],
//!   [`tag_suggestions`], [`tag_color`], [`random_tag_color`]
//! - Notes: [`notes_all`], [`note_by_id`], [`note_create`], [`note_update`],
//!   [`note_delete`], [`note_toggle_favorite`], [`note_toggle_archive`],
//!   [`note_favorites`], [`note_archived`], [`note_active`], [`search_notes`]
//! - View: [`filtered_notes`], [`view_title`]
//!
//! ## Response Format
//!
//! ```json
//! {"Ok": "<payload>"}
//! {"NotFound": "No note found with id: 42"}
//! {"BadRequest": "Null id pointer"}
//! ```
//!
//! For queries the `Ok` payload is itself a JSON document (an entity, an
//! array or a boolean) and must be parsed a second time. Colours, titles and
//! confirmation messages are returned as plain text.

pub mod config;
pub mod local_db_model;
pub mod local_db_state;
pub mod markup;
pub mod memory_state;
pub mod note_filter;
pub mod note_store;
pub mod notebook;
pub mod palette;
pub mod project_store;
pub mod storage;
pub mod tag_store;
pub mod validation;
mod app_response;

pub use crate::app_response::AppResponse;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::NotebookConfig;
use crate::local_db_model::{
    CreateNoteData, CreateProjectData, CreateTagData, UpdateNoteData, UpdateProjectData,
    UpdateTagData,
};
use crate::note_filter::ViewState;
use crate::notebook::Notebook;

/// Opens a notebook from a JSON [`NotebookConfig`].
///
/// # Parameters
///
/// * `config_json` - Null-terminated JSON config, or null for an in-memory
///   notebook with default keys
///
/// # Returns
///
/// A handle to pass to every other function, or a null pointer when the
/// config is not valid UTF-8 / JSON or names an empty namespace. An LMDB
/// path that cannot be opened does *not* fail: the notebook falls back to
/// memory storage and logs a warning.
///
/// The handle must be released with [`close_notebook`].
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use notebook_core::{close_notebook, open_notebook};
///
/// let config = CString::new(r#"{"storagePath":"my_notes"}"#).unwrap();
/// let notebook = open_notebook(config.as_ptr());
/// assert!(!notebook.is_null());
/// close_notebook(notebook);
/// ```
///
/// # JSON Format
///
/// Every field is optional:
/// ```json
/// {
///   "storagePath": "path/without/suffix",
///   "namespace": "notes-mentor",
///   "mapSize": 10485760
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn open_notebook(config_json: *const c_char) -> *mut Notebook {
    let config = if config_json.is_null() {
        NotebookConfig::default()
    } else {
        let json = match unsafe { CStr::from_ptr(config_json).to_str() } {
            Ok(s) => s,
            Err(e) => {
                warn!("Invalid UTF-8 in notebook config: {e}");
                return std::ptr::null_mut();
            }
        };
        match NotebookConfig::from_json(json) {
            Ok(config) => config,
            Err(e) => {
                warn!("Rejected notebook config: {e}");
                return std::ptr::null_mut();
            }
        }
    };

    let notebook = Notebook::open(&config);
    info!("Notebook opened (durable: {})", notebook.is_durable());
    Box::into_raw(Box::new(notebook))
}

/// Releases a handle returned by [`open_notebook`].
///
/// # Returns
///
/// `{"Ok":"Notebook closed successfully"}`, or `BadRequest` for a null
/// handle.
///
/// # Safety
///
/// The pointer must come from [`open_notebook`] and must not be used
/// afterwards.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn close_notebook(state: *mut Notebook) -> *const c_char {
    if state.is_null() {
        let error =
            AppResponse::BadRequest("Null state pointer passed to close_notebook".to_string());
        return response_to_c_string(&error);
    }
    drop(unsafe { Box::from_raw(state) });
    response_to_c_string(&AppResponse::success("Notebook closed successfully"))
}

/// Frees a string returned by any function in this library. Null is ignored.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_c_string(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr as *mut c_char) });
}

// ---- Projects ----

/// All projects in creation order.
///
/// # Returns
///
/// `Ok` with a JSON array of projects:
/// ```json
/// [{"id":"…","name":"Work","description":"","color":"#667eea",
///   "createdAt":"2024-01-15T10:30:00Z","updatedAt":"2024-01-15T10:30:00Z"}]
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn projects_all(state: *mut Notebook) -> *const c_char {
    with_notebook(state, "projects_all", |nb| ok_json(&nb.projects().projects()))
}

/// One project as JSON, or `NotFound`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn project_by_id(state: *mut Notebook, id: *const c_char) -> *const c_char {
    with_notebook(state, "project_by_id", |nb| {
        let id = c_ptr_to_string(id, "id")?;
        match nb.projects().get_project_by_id(&id) {
            Some(project) => ok_json(&project),
            None => Err(AppResponse::NotFound(format!("No project found with id: {id}"))),
        }
    })
}

/// Creates a project.
///
/// Name and description are trimmed. Name uniqueness is the caller's job
/// ([`project_exists`]).
///
/// # Parameters
///
/// * `state` - Handle from [`open_notebook`]
/// * `json_ptr` - Null-terminated JSON payload
///
/// # Returns
///
/// `Ok` with the stored project as JSON, `SerializationError` for a bad
/// payload, `BadRequest` for null pointers.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use notebook_core::{open_notebook, project_create};
///
/// let notebook = open_notebook(std::ptr::null());
/// let json = CString::new(r##"{"name":"Work","color":"#667eea"}"##).unwrap();
/// let result = project_create(notebook, json.as_ptr());
/// ```
///
/// # JSON Format
///
/// ```json
/// {
///   "name": "Work",
///   "description": "optional, defaults to empty",
///   "color": "#667eea"
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn project_create(state: *mut Notebook, json_ptr: *const c_char) -> *const c_char {
    with_notebook(state, "project_create", |nb| {
        let data: CreateProjectData = parse_json(json_ptr)?;
        ok_json(&nb.projects().create_project(data))
    })
}

/// Merges a partial update into a project and refreshes its `updatedAt`.
///
/// # Returns
///
/// `Ok` with the updated project, or `NotFound` when `id` is unknown.
///
/// # JSON Format
///
/// Any subset of:
/// ```json
/// {"name": "New name", "description": "…", "color": "#f97316"}
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn project_update(
    state: *mut Notebook,
    id: *const c_char,
    json_ptr: *const c_char,
) -> *const c_char {
    with_notebook(state, "project_update", |nb| {
        let id = c_ptr_to_string(id, "id")?;
        let patch: UpdateProjectData = parse_json(json_ptr)?;
        match nb.projects().update_project(&id, patch) {
            Some(project) => ok_json(&project),
            None => Err(AppResponse::NotFound(format!("No project found with id: {id}"))),
        }
    })
}

/// Removes a project. Its tags and notes are left in place with a dangling
/// `projectId`. Unknown ids still succeed.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn project_delete(state: *mut Notebook, id: *const c_char) -> *const c_char {
    with_notebook(state, "project_delete", |nb| {
        let id = c_ptr_to_string(id, "id")?;
        nb.projects().delete_project(&id);
        Ok(AppResponse::success("Project deleted successfully"))
    })
}

/// `Ok("true")` when a project with this name exists, ignoring case.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn project_exists(state: *mut Notebook, name: *const c_char) -> *const c_char {
    with_notebook(state, "project_exists", |nb| {
        let name = c_ptr_to_string(name, "name")?;
        ok_json(&nb.projects().project_exists(&name))
    })
}

/// A palette colour no project uses yet, as plain text (`Ok("#4facfe")`).
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn random_project_color(state: *mut Notebook) -> *const c_char {
    with_notebook(state, "random_project_color", |nb| {
        Ok(AppResponse::Ok(nb.projects().get_random_color()))
    })
}

// ---- Tags ----

/// All tags in creation order, as a JSON array.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn tags_all(state: *mut Notebook) -> *const c_char {
    with_notebook(state, "tags_all", |nb| ok_json(&nb.tags().tags()))
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn tags_for_project(
    state: *mut Notebook,
    project_id: *const c_char,
) -> *const c_char {
    with_notebook(state, "tags_for_project", |nb| {
        let project_id = c_ptr_to_string(project_id, "project_id")?;
        ok_json(&nb.tags().tags_for_project(&project_id))
    })
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn tag_by_id(state: *mut Notebook, id: *const c_char) -> *const c_char {
    with_notebook(state, "tag_by_id", |nb| {
        let id = c_ptr_to_string(id, "id")?;
        match nb.tags().get_tag_by_id(&id) {
            Some(tag) => ok_json(&tag),
            None => Err(AppResponse::NotFound(format!("No tag found with id: {id}"))),
        }
    })
}

/// Creates a tag. The name is trimmed. Check [`tag_exists`] first to keep
/// names unique within a project.
///
/// # Returns
///
/// `Ok` with the stored tag as JSON.
///
/// # JSON Format
///
/// ```json
/// {
///   "name": "urgent",
///   "color": "#43e97b",
///   "projectId": "project id"
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn tag_create(state: *mut Notebook, json_ptr: *const c_char) -> *const c_char {
    with_notebook(state, "tag_create", |nb| {
        let data: CreateTagData = parse_json(json_ptr)?;
        ok_json(&nb.tags().create_tag(data))
    })
}

/// Merges a partial update into a tag. Renaming does not touch notes that
/// carry the old name.
///
/// # Returns
///
/// `Ok` with the updated tag, or `NotFound`.
///
/// # JSON Format
///
/// Any subset of:
/// ```json
/// {"name": "later", "color": "#fa709a", "projectId": "…"}
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn tag_update(
    state: *mut Notebook,
    id: *const c_char,
    json_ptr: *const c_char,
) -> *const c_char {
    with_notebook(state, "tag_update", |nb| {
        let id = c_ptr_to_string(id, "id")?;
        let patch: UpdateTagData = parse_json(json_ptr)?;
        match nb.tags().update_tag(&id, patch) {
            Some(tag) => ok_json(&tag),
            None => Err(AppResponse::NotFound(format!("No tag found with id: {id}"))),
        }
    })
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn tag_delete(state: *mut Notebook, id: *const c_char) -> *const c_char {
    with_notebook(state, "tag_delete", |nb| {
        let id = c_ptr_to_string(id, "id")?;
        nb.tags().delete_tag(&id);
        Ok(AppResponse::success("Tag deleted successfully"))
    })
}

/// Case-insensitive tag name check.
///
/// # Parameters
///
/// * `name` - Tag name to look for
/// * `project_id` - Project to scope the check to. Null or empty checks
///   every project.
///
/// # Returns
///
/// `Ok("true")` or `Ok("false")`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn tag_exists(
    state: *mut Notebook,
    name: *const c_char,
    project_id: *const c_char,
) -> *const c_char {
    with_notebook(state, "tag_exists", |nb| {
        let name = c_ptr_to_string(name, "name")?;
        let project_id = optional_id(project_id, "project_id")?;
        ok_json(&nb.tags().tag_exists(&name, project_id.as_deref()))
    })
}

/// Tags ranked by how many notes carry their name, most used first. Tags no
/// note uses are left out.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn tags_most_used(state: *mut Notebook) -> *const c_char {
    with_notebook(state, "tags_most_used", |nb| ok_json(&nb.most_used_tags()))
}

/// Editor autocomplete: up to five tags whose name contains `input`.
///
/// # Parameters
///
/// * `input` - Text typed so far, matched case-insensitively
/// * `selected_json` - JSON array of tag names already on the note, or null
/// * `project_id` - Limits suggestions to one project. Null or empty means
///   every project.
///
/// # Returns
///
/// `Ok` with a JSON array of tags.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use notebook_core::{open_notebook, tag_suggestions};
///
/// let notebook = open_notebook(std::ptr::null());
/// let input = CString::new("wor").unwrap();
/// let selected = CString::new(r#"["work"]"#).unwrap();
/// let result = tag_suggestions(notebook, input.as_ptr(), selected.as_ptr(), std::ptr::null());
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn tag_suggestions(
    state: *mut Notebook,
    input: *const c_char,
    selected_json: *const c_char,
    project_id: *const c_char,
) -> *const c_char {
    with_notebook(state, "tag_suggestions", |nb| {
        let input = c_ptr_to_string(input, "input")?;
        let selected: Vec<String> = if selected_json.is_null() {
            Vec::new()
        } else {
            parse_json(selected_json)?
        };
        let project_id = optional_id(project_id, "project_id")?;
        ok_json(&nb.tags().suggest_tags(&input, &selected, project_id.as_deref()))
    })
}

/// Colour of the first tag with this name, as plain text. Unknown names get
/// the fallback colour.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn tag_color(state: *mut Notebook, name: *const c_char) -> *const c_char {
    with_notebook(state, "tag_color", |nb| {
        let name = c_ptr_to_string(name, "name")?;
        Ok(AppResponse::Ok(nb.tags().tag_color(&name)))
    })
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn random_tag_color(state: *mut Notebook) -> *const c_char {
    with_notebook(state, "random_tag_color", |nb| {
        Ok(AppResponse::Ok(nb.tags().get_random_color()))
    })
}

// ---- Notes ----

/// Every stored note, archived ones included, in creation order.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn notes_all(state: *mut Notebook) -> *const c_char {
    with_notebook(state, "notes_all", |nb| ok_json(&nb.notes().notes()))
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn note_by_id(state: *mut Notebook, id: *const c_char) -> *const c_char {
    with_notebook(state, "note_by_id", |nb| {
        let id = c_ptr_to_string(id, "id")?;
        match nb.notes().get_note_by_id(&id) {
            Some(note) => ok_json(&note),
            None => Err(AppResponse::NotFound(format!("No note found with id: {id}"))),
        }
    })
}

/// Creates a note. New notes are neither favourite nor archived.
///
/// # Parameters
///
/// * `state` - Handle from [`open_notebook`]
/// * `json_ptr` - Null-terminated JSON payload
///
/// # Returns
///
/// `Ok` with the stored note as JSON.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use notebook_core::{note_create, open_notebook};
///
/// let notebook = open_notebook(std::ptr::null());
/// let json = CString::new(
///     r#"{"title":"Standup","content":"<p>notes</p>","tags":["daily"],"projectId":"p1"}"#,
/// )
/// .unwrap();
/// let result = note_create(notebook, json.as_ptr());
/// ```
///
/// # JSON Format
///
/// ```json
/// {
///   "title": "Standup",
///   "content": "<p>rich text markup</p>",
///   "tags": ["daily"],
///   "projectId": "project id"
/// }
/// ```
///
/// `tags` may be omitted. Duplicate names are kept as given.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn note_create(state: *mut Notebook, json_ptr: *const c_char) -> *const c_char {
    with_notebook(state, "note_create", |nb| {
        let data: CreateNoteData = parse_json(json_ptr)?;
        ok_json(&nb.notes().create_note(data))
    })
}

/// Merges a partial update into a note and refreshes its `updatedAt`.
///
/// # Returns
///
/// `Ok` with the updated note, or `NotFound`.
///
/// # JSON Format
///
/// Any subset of:
/// ```json
/// {
///   "title": "…",
///   "content": "…",
///   "tags": ["…"],
///   "projectId": "…",
///   "isFavorite": true,
///   "isArchived": false
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn note_update(
    state: *mut Notebook,
    id: *const c_char,
    json_ptr: *const c_char,
) -> *const c_char {
    with_notebook(state, "note_update", |nb| {
        let id = c_ptr_to_string(id, "id")?;
        let patch: UpdateNoteData = parse_json(json_ptr)?;
        match nb.notes().update_note(&id, patch) {
            Some(note) => ok_json(&note),
            None => Err(AppResponse::NotFound(format!("No note found with id: {id}"))),
        }
    })
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn note_delete(state: *mut Notebook, id: *const c_char) -> *const c_char {
    with_notebook(state, "note_delete", |nb| {
        let id = c_ptr_to_string(id, "id")?;
        nb.notes().delete_note(&id);
        Ok(AppResponse::success("Note deleted successfully"))
    })
}

/// Flips `isFavorite`. Returns the updated note, or `NotFound`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn note_toggle_favorite(state: *mut Notebook, id: *const c_char) -> *const c_char {
    with_notebook(state, "note_toggle_favorite", |nb| {
        let id = c_ptr_to_string(id, "id")?;
        match nb.notes().toggle_favorite(&id) {
            Some(note) => ok_json(&note),
            None => Err(AppResponse::NotFound(format!("No note found with id: {id}"))),
        }
    })
}

/// Flips `isArchived`. Returns the updated note, or `NotFound`.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn note_toggle_archive(state: *mut Notebook, id: *const c_char) -> *const c_char {
    with_notebook(state, "note_toggle_archive", |nb| {
        let id = c_ptr_to_string(id, "id")?;
        match nb.notes().toggle_archive(&id) {
            Some(note) => ok_json(&note),
            None => Err(AppResponse::NotFound(format!("No note found with id: {id}"))),
        }
    })
}

/// Favourite notes that are not archived, in store order.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn note_favorites(state: *mut Notebook) -> *const c_char {
    with_notebook(state, "note_favorites", |nb| {
        ok_json(&nb.notes().get_favorite_notes())
    })
}

/// Archived notes, favourite or not.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn note_archived(state: *mut Notebook) -> *const c_char {
    with_notebook(state, "note_archived", |nb| {
        ok_json(&nb.notes().get_archived_notes())
    })
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn note_active(state: *mut Notebook) -> *const c_char {
    with_notebook(state, "note_active", |nb| ok_json(&nb.notes().get_active_notes()))
}

/// Notes whose title, plain-text content or a tag contains `term`, ignoring
/// case. A blank term returns every note. Archived notes are included.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn search_notes(state: *mut Notebook, term: *const c_char) -> *const c_char {
    with_notebook(state, "search_notes", |nb| {
        let term = c_ptr_to_string(term, "term")?;
        ok_json(&nb.notes().search_notes(&term))
    })
}

// ---- View ----

/// The note list to display for the current selection, newest first.
///
/// # Parameters
///
/// * `state` - Handle from [`open_notebook`]
/// * `view_json` - JSON [`ViewState`]
///
/// # Returns
///
/// `Ok` with a JSON array of notes sorted by `updatedAt` descending.
///
/// # Examples
///
/// ```no_run
/// use std::ffi::CString;
/// use notebook_core::{filtered_notes, open_notebook};
///
/// let notebook = open_notebook(std::ptr::null());
/// let view = CString::new(r#"{"viewMode":"favorites","searchTerm":"standup"}"#).unwrap();
/// let result = filtered_notes(notebook, view.as_ptr());
/// ```
///
/// # JSON Format
///
/// Every field is optional:
/// ```json
/// {
///   "viewMode": "all | favorites | archived",
///   "selectedTag": "tag name or null",
///   "selectedProject": "project id or null",
///   "searchTerm": ""
/// }
/// ```
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn filtered_notes(state: *mut Notebook, view_json: *const c_char) -> *const c_char {
    with_notebook(state, "filtered_notes", |nb| {
        let view: ViewState = parse_json(view_json)?;
        ok_json(&nb.filtered_notes(&view))
    })
}

/// Heading for the note list, as plain text (`Ok("Work: urgent")`).
/// Takes the same JSON as [`filtered_notes`].
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn view_title(state: *mut Notebook, view_json: *const c_char) -> *const c_char {
    with_notebook(state, "view_title", |nb| {
        let view: ViewState = parse_json(view_json)?;
        Ok(AppResponse::Ok(nb.view_title(&view)))
    })
}

// ---- Helpers ----

fn with_notebook(
    state: *mut Notebook,
    fn_name: &str,
    f: impl FnOnce(&Notebook) -> Result<AppResponse, AppResponse>,
) -> *const c_char {
    let notebook = match unsafe { state.as_ref() } {
        Some(nb) => nb,
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {fn_name}"));
            return response_to_c_string(&error);
        }
    };
    match f(notebook) {
        Ok(response) | Err(response) => response_to_c_string(&response),
    }
}

fn ok_json<T: Serialize>(value: &T) -> Result<AppResponse, AppResponse> {
    serde_json::to_string(value)
        .map(AppResponse::Ok)
        .map_err(|e| AppResponse::SerializationError(format!("Failed to serialize result: {e}")))
}

fn parse_json<T: DeserializeOwned>(ptr: *const c_char) -> Result<T, AppResponse> {
    let json = c_ptr_to_string(ptr, "JSON")?;
    serde_json::from_str(&json)
        .map_err(|e| AppResponse::SerializationError(format!("Invalid JSON: {e}")))
}

/// Null and empty both mean "not given".
fn optional_id(ptr: *const c_char, field_name: &str) -> Result<Option<String>, AppResponse> {
    if ptr.is_null() {
        return Ok(None);
    }
    let value = c_ptr_to_string(ptr, field_name)?;
    Ok(if value.is_empty() { None } else { Some(value) })
}

/// Serialises `response` into a C string owned by the caller.
fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, AppResponse> {
    if ptr.is_null() {
        return Err(AppResponse::BadRequest(format!("Null {field_name} pointer")));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => Err(AppResponse::BadRequest(format!(
            "Invalid UTF-8 in {field_name}: {e}"
        ))),
    }
}
