//! The add/edit form shared by every client surface.
//!
//! # Design
//! One type covers both modes. `TodoForm::new` starts empty and submits a
//! create; `TodoForm::edit` is prefilled from an existing item and submits a
//! full update that keeps the item's completion flag. The rules in
//! [`TodoForm::validate`] match the server's, so most bad input never leaves
//! the client. Submission only builds the request; the host sends it and
//! reports back through `submit_succeeded` / `submit_failed`.

use std::collections::BTreeMap;

use uuid::Uuid;

use crate::client::TodoClient;
use crate::error::{ApiError, FieldErrors};
use crate::http::HttpRequest;
use crate::types::{CreateTodo, Todo, UpdateTodo};

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const TITLE_REQUIRED_MESSAGE: &str = "Title is required.";
pub const SAVE_FAILED_MESSAGE: &str = "Failed to save TODO item.";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Create,
    Edit { id: Uuid, is_completed: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoForm {
    mode: Mode,
    pub title: String,
    pub description: String,
    error: Option<String>,
}

impl Default for TodoForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoForm {
    pub fn new() -> Self {
        Self {
            mode: Mode::Create,
            title: String::new(),
            description: String::new(),
            error: None,
        }
    }

    pub fn edit(todo: &Todo) -> Self {
        Self {
            mode: Mode::Edit {
                id: todo.id,
                is_completed: todo.is_completed,
            },
            title: todo.title.clone(),
            description: todo.description.clone().unwrap_or_default(),
            error: None,
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self.mode, Mode::Edit { .. })
    }

    pub fn heading(&self) -> &'static str {
        if self.is_edit() {
            "Edit TODO"
        } else {
            "Add New TODO"
        }
    }

    /// Only meaningful in edit mode; a new item always starts incomplete.
    pub fn set_completed(&mut self, done: bool) {
        if let Mode::Edit { is_completed, .. } = &mut self.mode {
            *is_completed = done;
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = BTreeMap::new();
        if self.title.trim().is_empty() {
            errors.insert("title".to_string(), vec![TITLE_REQUIRED_MESSAGE.to_string()]);
        } else if self.title.chars().count() > TITLE_MAX_CHARS {
            errors.insert("title".to_string(), vec![too_long("Title", TITLE_MAX_CHARS)]);
        }
        if self.description.chars().count() > DESCRIPTION_MAX_CHARS {
            errors.insert(
                "description".to_string(),
                vec![too_long("Description", DESCRIPTION_MAX_CHARS)],
            );
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Validate and build the request to send. On a validation failure the
    /// first message becomes the form error and `None` is returned.
    pub fn submit(&mut self, client: &TodoClient) -> Option<HttpRequest> {
        if let Err(errors) = self.validate() {
            self.error = errors.into_values().flatten().next();
            return None;
        }
        match self.build(client) {
            Ok(request) => {
                self.error = None;
                Some(request)
            }
            Err(err) => {
                self.submit_failed(&err);
                None
            }
        }
    }

    /// Clears the fields so a create form is ready for the next item.
    pub fn submit_succeeded(&mut self) {
        self.title.clear();
        self.description.clear();
        self.error = None;
    }

    pub fn submit_failed(&mut self, _err: &ApiError) {
        self.error = Some(SAVE_FAILED_MESSAGE.to_string());
    }

    // An empty field goes out as an absent description, never as `""`.
    fn description(&self) -> Option<String> {
        (!self.description.is_empty()).then(|| self.description.clone())
    }

    fn build(&self, client: &TodoClient) -> Result<HttpRequest, ApiError> {
        match self.mode {
            Mode::Create => client.build_create_todo(&CreateTodo {
                title: self.title.clone(),
                description: self.description(),
            }),
            Mode::Edit { id, is_completed } => client.build_update_todo(
                id,
                &UpdateTodo {
                    title: self.title.clone(),
                    description: self.description(),
                    is_completed,
                },
            ),
        }
    }
}

fn too_long(field: &str, max: usize) -> String {
    format!("{field} must be at most {max} characters.")
}
