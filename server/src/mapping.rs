//! Pure conversions between [`TodoItem`] and the DTOs.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::dto::{TodoItemCreateDto, TodoItemReadDto, TodoItemUpdateDto};
use crate::model::TodoItem;

/// New, unsaved entity. Completion is always false on create.
pub fn create_to_entity(dto: TodoItemCreateDto, id: Uuid, now: DateTime<Utc>) -> TodoItem {
    TodoItem {
        id,
        title: dto.title,
        description: dto.description,
        is_completed: false,
        created_at: now,
        version: 0,
    }
}

/// Overwrite the writable fields; identity, timestamp and version stay.
pub fn apply_update(dto: TodoItemUpdateDto, entity: &mut TodoItem) {
    entity.title = dto.title;
    entity.description = dto.description;
    entity.is_completed = dto.is_completed;
}

impl From<TodoItemCreateDto> for TodoItem {
    fn from(dto: TodoItemCreateDto) -> Self {
        create_to_entity(dto, Uuid::new_v4(), Utc::now())
    }
}

impl From<&TodoItem> for TodoItemReadDto {
    fn from(todo: &TodoItem) -> Self {
        Self {
            id: todo.id,
            title: todo.title.clone(),
            description: todo.description.clone(),
            is_completed: todo.is_completed,
            created_at: todo.created_at,
        }
    }
}
