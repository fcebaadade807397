//! Wire shapes for the todo endpoints.
//!
//! # Design
//! Each operation gets its own type so the allow-list of writable fields is
//! enforced by deserialization: the create shape has no completion flag, id or
//! timestamp, and unknown fields are ignored. Field names are camelCase on the
//! wire. A missing `title` deserializes to an empty string so it is reported
//! by validation as a field error rather than as a parse failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::validation::{validate_description, validate_title};

#[derive(Clone, Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoItemCreateDto {
    #[serde(default)]
    #[validate(custom(function = "validate_title"))]
    #[schema(max_length = 200, pattern = r"\S", example = "Buy milk")]
    pub title: String,
    #[validate(custom(function = "validate_description"))]
    #[schema(max_length = 1000)]
    pub description: Option<String>,
}

/// Full replacement of the writable fields. An omitted `isCompleted` means
/// false, not "unchanged".
#[derive(Clone, Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoItemUpdateDto {
    #[serde(default)]
    #[validate(custom(function = "validate_title"))]
    #[schema(max_length = 200, pattern = r"\S")]
    pub title: String,
    #[validate(custom(function = "validate_description"))]
    #[schema(max_length = 1000)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodoItemReadDto {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}
