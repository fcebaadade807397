//! SQLite-backed store for [`TodoItem`].
//!
//! # Table Schema
//!
//! ```sql
//! CREATE TABLE todo_items (
//!     id           TEXT PRIMARY KEY NOT NULL,
//!     title        TEXT NOT NULL,
//!     description  TEXT,
//!     is_completed INTEGER NOT NULL DEFAULT 0,
//!     created_at   TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
//!     version      INTEGER NOT NULL DEFAULT 1
//! );
//! ```
//!
//! Updates and deletes are guarded by `WHERE id = ? AND version = ?`; zero
//! affected rows means another writer got there first.

use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

use crate::model::TodoItem;
use crate::repository::{Change, Store, StoreError};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS todo_items (
    id           TEXT PRIMARY KEY NOT NULL,
    title        TEXT NOT NULL CHECK (length(title) BETWEEN 1 AND 200),
    description  TEXT CHECK (description IS NULL OR length(description) <= 1000),
    is_completed INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    version      INTEGER NOT NULL DEFAULT 1
)";

const LIST: &str = "SELECT id, title, description, is_completed, created_at, version
                    FROM todo_items ORDER BY rowid";

const GET_BY_ID: &str = "SELECT id, title, description, is_completed, created_at, version
                         FROM todo_items WHERE id = ?";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::database(err)
    }
}

#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for `url`, e.g. `sqlite://todos.db?mode=rwc`.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new().max_connections(5).connect(url).await?;
        Ok(Self::new(pool))
    }

    /// A private in-memory database. Pinned to a single connection that is
    /// never recycled, since each SQLite memory connection is its own database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Ok(Self::new(pool))
    }

    /// Create the table if it does not exist yet.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA).execute(&self.pool).await?;
        tracing::info!("todo_items schema is up to date");
        Ok(())
    }
}

fn todo_from_row(row: &SqliteRow) -> Result<TodoItem, StoreError> {
    let id: String = row.try_get("id")?;
    let version: i64 = row.try_get("version")?;
    Ok(TodoItem {
        id: Uuid::parse_str(&id).map_err(StoreError::database)?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        is_completed: row.try_get("is_completed")?,
        created_at: row.try_get("created_at")?,
        version: u64::try_from(version).map_err(StoreError::database)?,
    })
}

impl Store<TodoItem> for SqliteStore {
    async fn list(&self) -> Result<Vec<TodoItem>, StoreError> {
        let rows = sqlx::query(LIST).fetch_all(&self.pool).await?;
        rows.iter().map(todo_from_row).collect()
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<TodoItem>, StoreError> {
        let row = sqlx::query(GET_BY_ID)
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(todo_from_row).transpose()
    }

    async fn commit(&self, changes: Vec<Change<TodoItem>>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        for change in changes {
            match change {
                Change::Add(todo) => {
                    sqlx::query(
                        "INSERT INTO todo_items (id, title, description, is_completed, created_at, version)
                         VALUES (?, ?, ?, ?, ?, 1)",
                    )
                    .bind(todo.id.to_string())
                    .bind(todo.title)
                    .bind(todo.description)
                    .bind(todo.is_completed)
                    .bind(todo.created_at)
                    .execute(&mut *tx)
                    .await?;
                }
                Change::Update(todo) => {
                    let result = sqlx::query(
                        "UPDATE todo_items
                         SET title = ?, description = ?, is_completed = ?, version = version + 1
                         WHERE id = ? AND version = ?",
                    )
                    .bind(todo.title)
                    .bind(todo.description)
                    .bind(todo.is_completed)
                    .bind(todo.id.to_string())
                    .bind(todo.version as i64)
                    .execute(&mut *tx)
                    .await?;
                    if result.rows_affected() == 0 {
                        return Err(StoreError::conflict::<TodoItem>(todo.id));
                    }
                }
                Change::Delete(todo) => {
                    let result = sqlx::query("DELETE FROM todo_items WHERE id = ? AND version = ?")
                        .bind(todo.id.to_string())
                        .bind(todo.version as i64)
                        .execute(&mut *tx)
                        .await?;
                    if result.rows_affected() == 0 {
                        return Err(StoreError::conflict::<TodoItem>(todo.id));
                    }
                }
            }
        }
        tx.commit().await?;
        Ok(())
    }
}
