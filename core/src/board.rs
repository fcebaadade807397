//! Client-side list state with optimistic mutations.
//!
//! # Design
//! `TodoBoard` is the client's only copy of the list. It never performs I/O:
//! mutating calls change the local list first and hand back what the host has
//! to send, and the matching `*_failed` call repairs local state when the
//! server says no. A failed toggle is reverted in place; a failed delete is
//! repaired by a full re-fetch, since the removed item is no longer known.
//! Filtering and the summary are computed locally and never hit the server.

use std::fmt;

use uuid::Uuid;

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::types::{Todo, UpdateTodo};

pub const SERVER_FALLBACK_MESSAGE: &str = "An unexpected server error occurred.";
pub const NETWORK_ERROR_MESSAGE: &str = "Network Error: Please check your internet connection.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Completed,
    Incomplete,
}

impl Filter {
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Filter::All => true,
            Filter::Completed => todo.is_completed,
            Filter::Incomplete => !todo.is_completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub incomplete: usize,
    pub total: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "You have {} incomplete task(s) of {}", self.incomplete, self.total)
    }
}

/// The host must re-fetch the whole list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Resync;

/// A toggle that has been applied locally but not yet confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct PendingToggle {
    prior: Todo,
    update: UpdateTodo,
}

impl PendingToggle {
    pub fn id(&self) -> Uuid {
        self.prior.id
    }

    pub fn update(&self) -> &UpdateTodo {
        &self.update
    }

    pub fn request(&self, client: &TodoClient) -> Result<HttpRequest, ApiError> {
        client.build_update_todo(self.prior.id, &self.update)
    }
}

#[derive(Debug, Clone, Default)]
pub struct TodoBoard {
    todos: Vec<Todo>,
    loading: bool,
    error: Option<String>,
}

impl TodoBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn get(&self, id: Uuid) -> Option<&Todo> {
        self.todos.iter().find(|todo| todo.id == id)
    }

    pub fn begin_fetch(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// On failure the previous list is kept and the error is recorded.
    pub fn finish_fetch(&mut self, result: Result<Vec<Todo>, ApiError>) {
        self.loading = false;
        match result {
            Ok(todos) => self.todos = todos,
            Err(err) => self.error = Some(error_text(&err)),
        }
    }

    pub fn visible(&self, filter: Filter) -> Vec<&Todo> {
        self.todos.iter().filter(|todo| filter.matches(todo)).collect()
    }

    pub fn summary(&self) -> Summary {
        Summary {
            incomplete: self.todos.iter().filter(|todo| !todo.is_completed).count(),
            total: self.todos.len(),
        }
    }

    /// Remove `id` locally and return the delete request to send.
    pub fn delete_optimistic(&mut self, client: &TodoClient, id: Uuid) -> HttpRequest {
        self.todos.retain(|todo| todo.id != id);
        client.build_delete_todo(id)
    }

    pub fn delete_failed(&mut self, err: &ApiError) -> Resync {
        self.error = Some(error_text(err));
        Resync
    }

    /// Flip the completion flag of `id` locally. `None` if the item is not on
    /// the board. A missing description is sent as an empty string.
    pub fn toggle_optimistic(&mut self, id: Uuid) -> Option<PendingToggle> {
        let todo = self.todos.iter_mut().find(|todo| todo.id == id)?;
        let prior = todo.clone();
        todo.is_completed = !todo.is_completed;
        let update = UpdateTodo {
            title: todo.title.clone(),
            description: Some(todo.description.clone().unwrap_or_default()),
            is_completed: todo.is_completed,
        };
        Some(PendingToggle { prior, update })
    }

    /// Put the pre-toggle item back, if it is still on the board.
    pub fn toggle_failed(&mut self, pending: PendingToggle, err: &ApiError) {
        self.error = Some(error_text(err));
        if let Some(todo) = self.todos.iter_mut().find(|todo| todo.id == pending.prior.id) {
            *todo = pending.prior;
        }
    }
}

/// User-facing text for a failed request.
pub fn error_text(err: &ApiError) -> String {
    match err {
        ApiError::Transport(_) => NETWORK_ERROR_MESSAGE.to_string(),
        ApiError::Deserialization(msg) | ApiError::Serialization(msg) => format!("Error: {msg}"),
        server => {
            let message = server
                .server_message()
                .filter(|m| !m.is_empty())
                .unwrap_or(SERVER_FALLBACK_MESSAGE);
            format!("Server Error: {message}")
        }
    }
}
