use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::repository::{Change, Entity, Store, StoreError};

#[derive(Clone)]
struct Row<E> {
    seq: u64,
    entity: E,
}

#[derive(Clone)]
struct Table<E: Entity> {
    rows: HashMap<E::Id, Row<E>>,
    next_seq: u64,
}

impl<E: Entity> Table<E> {
    fn apply(&mut self, change: Change<E>) -> Result<(), StoreError> {
        match change {
            Change::Add(mut entity) => {
                let id = entity.id();
                if self.rows.contains_key(&id) {
                    return Err(StoreError::database(format!(
                        "duplicate key: {} {id} already exists",
                        E::NAME
                    )));
                }
                entity.set_version(1);
                let seq = self.next_seq;
                self.next_seq += 1;
                self.rows.insert(id, Row { seq, entity });
            }
            Change::Update(mut entity) => {
                let id = entity.id();
                let row = self
                    .rows
                    .get_mut(&id)
                    .filter(|row| row.entity.version() == entity.version())
                    .ok_or_else(|| StoreError::conflict::<E>(id))?;
                entity.set_version(entity.version() + 1);
                row.entity = entity;
            }
            Change::Delete(entity) => {
                let id = entity.id();
                match self.rows.get(&id) {
                    Some(row) if row.entity.version() == entity.version() => {
                        self.rows.remove(&id);
                    }
                    _ => return Err(StoreError::conflict::<E>(id)),
                }
            }
        }
        Ok(())
    }
}

/// Process-local store keyed by entity id. Listing follows insertion order.
pub struct InMemoryStore<E: Entity> {
    table: Arc<RwLock<Table<E>>>,
}

impl<E: Entity> Clone for InMemoryStore<E> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
        }
    }
}

impl<E: Entity> Default for InMemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> InMemoryStore<E> {
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(Table {
                rows: HashMap::new(),
                next_seq: 0,
            })),
        }
    }
}

impl<E: Entity> Store<E> for InMemoryStore<E> {
    async fn list(&self) -> Result<Vec<E>, StoreError> {
        let table = self.table.read().await;
        let mut rows: Vec<&Row<E>> = table.rows.values().collect();
        rows.sort_by_key(|row| row.seq);
        Ok(rows.into_iter().map(|row| row.entity.clone()).collect())
    }

    async fn get_by_id(&self, id: E::Id) -> Result<Option<E>, StoreError> {
        let table = self.table.read().await;
        Ok(table.rows.get(&id).map(|row| row.entity.clone()))
    }

    async fn commit(&self, changes: Vec<Change<E>>) -> Result<(), StoreError> {
        let mut table = self.table.write().await;
        let mut scratch = table.clone();
        for change in changes {
            scratch.apply(change)?;
        }
        *table = scratch;
        Ok(())
    }
}
