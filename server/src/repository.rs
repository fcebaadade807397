//! Generic unit-of-work repository over a [`Store`].
//!
//! # Design
//! Reads go straight to the store. Writes (`add`, `update`, `delete`) are
//! only staged on the `Repository` value; nothing is durable until
//! [`Repository::persist`] hands the whole batch to [`Store::commit`], which
//! applies it atomically. A `Repository` is built per request from a cheap
//! clone of the shared store handle, so staged changes are never visible to
//! other requests.
//!
//! Optimistic concurrency rides on [`Entity::version`]: a staged update or
//! delete carries the version it was loaded with, and the store refuses the
//! commit with [`StoreError::Conflict`] if the row has moved on.

use std::fmt;
use std::future::Future;
use std::hash::Hash;

use thiserror::Error;

/// A record type the repository can manage.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Copy + Eq + Hash + fmt::Display + Send + Sync + 'static;

    /// Human-readable name used in log lines and error messages.
    const NAME: &'static str;

    fn id(&self) -> Self::Id;

    fn version(&self) -> u64;

    fn set_version(&mut self, version: u64);
}

/// One staged mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Change<E> {
    Add(E),
    Update(E),
    Delete(E),
}

#[derive(Debug, Error)]
pub enum StoreError {
    /// The row changed or disappeared between load and commit.
    #[error("concurrency conflict on {entity} {id}")]
    Conflict { entity: &'static str, id: String },

    #[error("database error: {0}")]
    Database(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn conflict<E: Entity>(id: E::Id) -> Self {
        StoreError::Conflict {
            entity: E::NAME,
            id: id.to_string(),
        }
    }

    pub fn database(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        StoreError::Database(err.into())
    }
}

/// Storage backend for one entity type.
pub trait Store<E: Entity>: Clone + Send + Sync + 'static {
    /// All records in insertion order.
    fn list(&self) -> impl Future<Output = Result<Vec<E>, StoreError>> + Send;

    fn get_by_id(&self, id: E::Id) -> impl Future<Output = Result<Option<E>, StoreError>> + Send;

    /// Apply every change or none of them.
    fn commit(&self, changes: Vec<Change<E>>) -> impl Future<Output = Result<(), StoreError>> + Send;
}

pub struct Repository<E, S> {
    store: S,
    staged: Vec<Change<E>>,
}

impl<E: Entity, S: Store<E>> Repository<E, S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            staged: Vec::new(),
        }
    }

    pub async fn list(&self) -> Result<Vec<E>, StoreError> {
        self.store.list().await
    }

    pub async fn get_by_id(&self, id: E::Id) -> Result<Option<E>, StoreError> {
        self.store.get_by_id(id).await
    }

    pub fn add(&mut self, entity: E) {
        self.staged.push(Change::Add(entity));
    }

    pub fn update(&mut self, entity: E) {
        self.staged.push(Change::Update(entity));
    }

    pub fn delete(&mut self, entity: E) {
        self.staged.push(Change::Delete(entity));
    }

    /// Number of staged, uncommitted changes.
    pub fn pending(&self) -> usize {
        self.staged.len()
    }

    /// Commit everything staged so far. On failure the stage is dropped too;
    /// the caller reloads before trying again.
    pub async fn persist(&mut self) -> Result<(), StoreError> {
        if self.staged.is_empty() {
            return Ok(());
        }
        let changes = std::mem::take(&mut self.staged);
        let count = changes.len();
        self.store.commit(changes).await?;
        tracing::debug!(entity = E::NAME, changes = count, "committed staged changes");
        Ok(())
    }
}
