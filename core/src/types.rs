//! Wire types for the todo API, as seen by clients.
//!
//! # Design
//! These mirror the server's DTOs but are defined independently so the client
//! does not depend on the server crate. The integration test catches schema
//! drift between the two.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single todo item returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Request payload for creating a new todo. New items always start incomplete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodo {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Request payload for updating an existing todo. Every writable field is
/// sent; the server replaces all of them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodo {
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
}

impl UpdateTodo {
    /// The writable fields of `todo`, unchanged.
    pub fn from_todo(todo: &Todo) -> Self {
        Self {
            title: todo.title.clone(),
            description: todo.description.clone(),
            is_completed: todo.is_completed,
        }
    }
}
