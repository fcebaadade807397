//! OpenAPI document served under the open `/swagger` prefix.
//!
//! Schemas are derived from the DTOs and operations from the handler
//! annotations, so the document follows `dto.rs` and `handlers.rs`.

use axum::Json;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::dto::{TodoItemCreateDto, TodoItemReadDto, TodoItemUpdateDto};
use crate::error::ErrorBody;
use crate::handlers::{self, HealthResponse};

pub const OPENAPI_PATH: &str = "/swagger/v1/swagger.json";
pub const SECURITY_SCHEME: &str = "ApiKey";

#[derive(OpenApi)]
#[openapi(
    info(title = "TodoApp API", version = "v1"),
    paths(
        handlers::list_todos,
        handlers::get_todo,
        handlers::create_todo,
        handlers::update_todo,
        handlers::delete_todo,
        handlers::health,
    ),
    components(schemas(TodoItemCreateDto, TodoItemUpdateDto, TodoItemReadDto, ErrorBody, HealthResponse)),
    modifiers(&ApiKeyAuth),
    security(("ApiKey" = [])),
    tags((name = "Todos", description = "TODO item management"))
)]
pub struct ApiDoc;

struct ApiKeyAuth;

impl Modify for ApiKeyAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                SECURITY_SCHEME,
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-API-KEY"))),
            );
        }
    }
}

pub async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use serde_json::Value;
    use uuid::Uuid;

    use super::*;

    fn document() -> Value {
        serde_json::to_value(ApiDoc::openapi()).unwrap()
    }

    fn property_names(doc: &Value, schema: &str) -> Vec<String> {
        let mut names: Vec<String> = doc["components"]["schemas"][schema]["properties"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    #[test]
    fn documents_every_todo_operation() {
        let doc = document();
        for (path, methods) in [
            ("/Todos", &["get", "post"][..]),
            ("/Todos/{id}", &["get", "put", "delete"][..]),
        ] {
            for method in methods {
                assert!(doc["paths"][path][method].is_object(), "{method} {path}");
            }
        }
        assert_eq!(
            doc["components"]["securitySchemes"][SECURITY_SCHEME]["name"],
            "X-API-KEY"
        );
    }

    #[test]
    fn read_schema_matches_the_serialized_dto() {
        let dto = TodoItemReadDto {
            id: Uuid::nil(),
            title: "t".to_string(),
            description: None,
            is_completed: false,
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        };
        let mut wire: Vec<String> = serde_json::to_value(dto)
            .unwrap()
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        wire.sort();
        assert_eq!(property_names(&document(), "TodoItemReadDto"), wire);
    }

    #[test]
    fn write_schemas_follow_serde_defaults() {
        let doc = document();
        assert_eq!(
            property_names(&doc, "TodoItemUpdateDto"),
            ["description", "isCompleted", "title"]
        );
        let required = &doc["components"]["schemas"]["TodoItemUpdateDto"]["required"];
        assert!(!required
            .as_array()
            .is_some_and(|fields| fields.iter().any(|f| f == "title")));

        let title = &doc["components"]["schemas"]["TodoItemCreateDto"]["properties"]["title"];
        assert_eq!(title["maxLength"], 200);
        assert_eq!(title["pattern"], r"\S");
    }

    #[test]
    fn health_needs_no_key() {
        let doc = document();
        assert_eq!(doc["paths"]["/health"]["get"]["security"], serde_json::json!([{}]));
    }
}
