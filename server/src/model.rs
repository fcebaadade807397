//! Persisted entity for the todo table.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::repository::Entity;

/// A todo record as stored. Never serialized directly; the wire shapes live
/// in [`crate::dto`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TodoItem {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    /// Concurrency token. Zero until the first commit, then bumped by the
    /// store on every committed update.
    pub version: u64,
}

impl Entity for TodoItem {
    type Id = Uuid;

    const NAME: &'static str = "TODO item";

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}
