//! Endpoint handlers for `/Todos`, plus the unauthenticated health check.
//!
//! # Design
//! Handlers are generic over the [`Store`] so the same router runs on SQLite
//! in production and on [`crate::store::InMemoryStore`] in tests. Each request
//! gets its own [`Repository`] unit of work from [`AppState::repository`].
//! Body and path extraction failures are taken as `Result`s and turned into
//! 400s here, so framework rejections never reach the client as plain text.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::dto::{TodoItemCreateDto, TodoItemReadDto, TodoItemUpdateDto};
use crate::error::{ApiError, ErrorBody};
use crate::mapping;
use crate::model::TodoItem;
use crate::repository::{Entity, Repository, Store};
use crate::validation;

pub const TODOS_PATH: &str = "/Todos";

pub struct AppState<S> {
    store: S,
}

impl<S: Clone> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: Store<TodoItem>> AppState<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn repository(&self) -> Repository<TodoItem, S> {
        Repository::new(self.store.clone())
    }
}

fn todo_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

async fn load<S: Store<TodoItem>>(
    repo: &Repository<TodoItem, S>,
    id: Uuid,
) -> Result<TodoItem, ApiError> {
    repo.get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found(TodoItem::NAME, id))
}

#[utoipa::path(
    get,
    path = "/Todos",
    tag = "Todos",
    summary = "Retrieves all TODO items.",
    responses(
        (status = 200, description = "All TODO items", body = [TodoItemReadDto]),
        (status = 401, description = "No API key", body = ErrorBody),
        (status = 403, description = "Wrong API key", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    )
)]
pub async fn list_todos<S: Store<TodoItem>>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<TodoItemReadDto>>, ApiError> {
    let todos = state.repository().list().await?;
    Ok(Json(todos.iter().map(TodoItemReadDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/Todos/{id}",
    tag = "Todos",
    summary = "Retrieves a specific TODO item by its unique ID.",
    params(("id" = Uuid, Path, description = "TODO item id")),
    responses(
        (status = 200, description = "The TODO item", body = TodoItemReadDto),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No such item", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    )
)]
pub async fn get_todo<S: Store<TodoItem>>(
    State(state): State<AppState<S>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<TodoItemReadDto>, ApiError> {
    let id = todo_id(path)?;
    let todo = load(&state.repository(), id).await?;
    Ok(Json(TodoItemReadDto::from(&todo)))
}

#[utoipa::path(
    post,
    path = "/Todos",
    tag = "Todos",
    summary = "Creates a new TODO item.",
    request_body = TodoItemCreateDto,
    responses(
        (status = 201, description = "Created", body = TodoItemReadDto,
            headers(("Location" = String, description = "URL of the new item"))),
        (status = 400, description = "Invalid body", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    )
)]
pub async fn create_todo<S: Store<TodoItem>>(
    State(state): State<AppState<S>>,
    payload: Result<Json<TodoItemCreateDto>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let dto = json_body(payload)?;
    validation::check(&dto).map_err(ApiError::Validation)?;

    let todo = TodoItem::from(dto);
    let mut repo = state.repository();
    repo.add(todo.clone());
    repo.persist().await?;

    tracing::info!(todo_id = %todo.id, "created TODO item");
    let location = format!("{TODOS_PATH}/{}", todo.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(TodoItemReadDto::from(&todo)),
    ))
}

#[utoipa::path(
    put,
    path = "/Todos/{id}",
    tag = "Todos",
    summary = "Updates an existing TODO item.",
    params(("id" = Uuid, Path, description = "TODO item id")),
    request_body = TodoItemUpdateDto,
    responses(
        (status = 204, description = "Updated"),
        (status = 400, description = "Invalid body or id", body = ErrorBody),
        (status = 404, description = "No such item", body = ErrorBody),
        (status = 409, description = "Concurrent modification", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    )
)]
pub async fn update_todo<S: Store<TodoItem>>(
    State(state): State<AppState<S>>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<TodoItemUpdateDto>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let id = todo_id(path)?;
    let dto = json_body(payload)?;
    validation::check(&dto).map_err(ApiError::Validation)?;

    let mut repo = state.repository();
    let mut todo = load(&repo, id).await?;
    mapping::apply_update(dto, &mut todo);
    repo.update(todo);
    repo.persist().await?;

    tracing::info!(todo_id = %id, "updated TODO item");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/Todos/{id}",
    tag = "Todos",
    summary = "Deletes a specific TODO item.",
    params(("id" = Uuid, Path, description = "TODO item id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Malformed id", body = ErrorBody),
        (status = 404, description = "No such item", body = ErrorBody),
        (status = 409, description = "Concurrent modification", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody),
    )
)]
pub async fn delete_todo<S: Store<TodoItem>>(
    State(state): State<AppState<S>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = todo_id(path)?;

    let mut repo = state.repository();
    let todo = load(&repo, id).await?;
    repo.delete(todo);
    repo.persist().await?;

    tracing::info!(todo_id = %id, "deleted TODO item");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    security(()),
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
