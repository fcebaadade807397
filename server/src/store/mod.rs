//! Storage backends behind the [`crate::repository::Store`] trait.

mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;
