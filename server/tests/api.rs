use axum::{
    http::{self, Request, StatusCode},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use todo_server::{
    app,
    config::AppConfig,
    dto::TodoItemReadDto,
    error::{ErrorBody, CONFLICT_MESSAGE, DATABASE_MESSAGE},
    model::TodoItem,
    repository::{Change, Store, StoreError},
    store::InMemoryStore,
};

const KEY: &str = "test-key";

fn router() -> (Router, InMemoryStore<TodoItem>) {
    let store = InMemoryStore::new();
    (app(&AppConfig::with_api_key(KEY), store.clone()), store)
}

async fn body_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", KEY)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-api-key", KEY)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

async fn create(router: &Router, body: Value) -> TodoItemReadDto {
    let resp = router
        .clone()
        .oneshot(json_request("POST", "/Todos", &body.to_string()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

// --- list ---

#[tokio::test]
async fn list_todos_empty() {
    let (router, _) = router();
    let resp = router.oneshot(request("GET", "/Todos")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<TodoItemReadDto> = body_json(resp).await;
    assert!(todos.is_empty());
}

#[tokio::test]
async fn list_follows_insertion_order() {
    let (router, _) = router();
    for title in ["one", "two", "three"] {
        create(&router, json!({ "title": title })).await;
    }

    let resp = router.oneshot(request("GET", "/Todos")).await.unwrap();
    let todos: Vec<TodoItemReadDto> = body_json(resp).await;
    let titles: Vec<_> = todos.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["one", "two", "three"]);
}

// --- create ---

#[tokio::test]
async fn create_returns_201_with_location() {
    let (router, _) = router();
    let resp = router
        .clone()
        .oneshot(json_request("POST", "/Todos", r#"{"title":"Buy milk"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let location = resp.headers()[http::header::LOCATION].to_str().unwrap().to_string();
    let body: Value = body_json(resp).await;
    assert_eq!(body["title"], "Buy milk");
    assert_eq!(body["isCompleted"], false);
    assert!(body["description"].is_null());
    assert!(body["createdAt"].is_string());
    assert_eq!(location, format!("/Todos/{}", body["id"].as_str().unwrap()));

    let resp = router.oneshot(request("GET", &location)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn create_ignores_client_completion_flag() {
    let (router, _) = router();
    let todo = create(&router, json!({ "title": "Done already?", "isCompleted": true })).await;
    assert!(!todo.is_completed);
}

#[tokio::test]
async fn create_with_empty_title_is_400_with_field_errors() {
    let (router, store) = router();
    let resp = router
        .oneshot(json_request("POST", "/Todos", r#"{"title":""}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = body_json(resp).await;
    let errors = body.errors.unwrap();
    assert_eq!(errors["title"], vec!["The title field is required."]);
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn create_without_title_is_400() {
    let (router, _) = router();
    let resp = router
        .oneshot(json_request("POST", "/Todos", r#"{"description":"no title"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn title_length_boundary() {
    let (router, _) = router();
    create(&router, json!({ "title": "a".repeat(200) })).await;

    let resp = router
        .oneshot(json_request(
            "POST",
            "/Todos",
            &json!({ "title": "a".repeat(201) }).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_400_json() {
    let (router, _) = router();
    let resp = router
        .oneshot(json_request("POST", "/Todos", "{not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = body_json(resp).await;
    assert!(!body.message.is_empty());
}

// --- get ---

#[tokio::test]
async fn get_missing_is_404_naming_the_id() {
    let (router, _) = router();
    let id = Uuid::new_v4();
    let resp = router
        .oneshot(request("GET", &format!("/Todos/{id}")))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.message, format!("TODO item with ID {id} not found."));
}

#[tokio::test]
async fn get_with_bad_id_is_400() {
    let (router, _) = router();
    let resp = router
        .oneshot(request("GET", "/Todos/not-a-uuid"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let _: ErrorBody = body_json(resp).await;
}

// --- update ---

#[tokio::test]
async fn update_replaces_writable_fields() {
    let (router, _) = router();
    let created = create(&router, json!({ "title": "A" })).await;
    let uri = format!("/Todos/{}", created.id);

    let resp = router
        .clone()
        .oneshot(json_request(
            "PUT",
            &uri,
            r#"{"title":"B","description":"d","isCompleted":true}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = router.oneshot(request("GET", &uri)).await.unwrap();
    let todo: TodoItemReadDto = body_json(resp).await;
    assert_eq!(todo.title, "B");
    assert_eq!(todo.description.as_deref(), Some("d"));
    assert!(todo.is_completed);
    assert_eq!(todo.id, created.id);
    assert_eq!(todo.created_at, created.created_at);
}

#[tokio::test]
async fn update_missing_is_404() {
    let (router, _) = router();
    let resp = router
        .oneshot(json_request(
            "PUT",
            &format!("/Todos/{}", Uuid::new_v4()),
            r#"{"title":"x"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_with_blank_title_leaves_item_unchanged() {
    let (router, _) = router();
    let created = create(&router, json!({ "title": "keep me" })).await;
    let uri = format!("/Todos/{}", created.id);

    let resp = router
        .clone()
        .oneshot(json_request("PUT", &uri, r#"{"title":"  ","isCompleted":true}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = router.oneshot(request("GET", &uri)).await.unwrap();
    let todo: TodoItemReadDto = body_json(resp).await;
    assert_eq!(todo, created);
}

// --- delete ---

#[tokio::test]
async fn delete_then_get_is_404() {
    let (router, _) = router();
    let created = create(&router, json!({ "title": "temp" })).await;
    let uri = format!("/Todos/{}", created.id);

    let resp = router.clone().oneshot(request("DELETE", &uri)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = router.clone().oneshot(request("GET", &uri)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = router.oneshot(request("DELETE", &uri)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- gate ---

#[tokio::test]
async fn missing_key_is_401() {
    let (router, _) = router();
    let resp = router
        .oneshot(Request::builder().uri("/Todos").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.message, "API Key was not provided.");
}

#[tokio::test]
async fn wrong_key_is_403() {
    let (router, _) = router();
    let resp = router
        .oneshot(
            Request::builder()
                .uri("/Todos")
                .header("x-api-key", "nope")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.message, "Unauthorized client.");
}

#[tokio::test]
async fn gate_runs_before_validation() {
    let (router, store) = router();
    let resp = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/Todos")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(r#"{"title":""}"#.to_string())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn health_and_docs_are_open() {
    let (router, _) = router();
    let resp = router
        .clone()
        .oneshot(Request::builder().uri("/health").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["status"], "healthy");

    let resp = router
        .oneshot(
            Request::builder()
                .uri("/swagger/v1/swagger.json")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let doc: Value = body_json(resp).await;
    assert!(doc["paths"]["/Todos"]["post"].is_object());
    assert_eq!(doc["components"]["securitySchemes"]["ApiKey"]["in"], "header");
}

#[tokio::test]
async fn preflight_bypasses_the_gate() {
    let mut config = AppConfig::with_api_key(KEY);
    config.allowed_origins = vec![http::HeaderValue::from_static("http://localhost:5173")];
    let router = app(&config, InMemoryStore::<TodoItem>::new());

    let resp = router
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/Todos")
                .header(http::header::ORIGIN, "http://localhost:5173")
                .header(http::header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
                .header(http::header::ACCESS_CONTROL_REQUEST_HEADERS, "x-api-key")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert_eq!(headers[http::header::ACCESS_CONTROL_ALLOW_ORIGIN], "http://localhost:5173");
    assert_eq!(headers[http::header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(headers[http::header::ACCESS_CONTROL_ALLOW_METHODS], "PUT");
}

// --- fallbacks ---

#[tokio::test]
async fn unknown_route_is_json_404() {
    let (router, _) = router();
    let resp = router.oneshot(request("GET", "/nowhere")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.message, "Not Found");
}

#[tokio::test]
async fn routes_match_case_sensitively() {
    let (router, store) = router();
    let resp = router
        .clone()
        .oneshot(json_request("POST", "/todos", r#"{"title":"milk"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.message, "Not Found");
    assert!(store.list().await.unwrap().is_empty());

    // Still gated: the 404 is only reachable with a valid key.
    let resp = router
        .oneshot(Request::builder().uri("/TODOS").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_method_is_json_405() {
    let (router, _) = router();
    let resp = router.oneshot(request("PATCH", "/Todos")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.message, "Method Not Allowed");
}

// --- store failures ---

/// Serves reads from an inner store and refuses every commit.
#[derive(Clone)]
struct RefusingStore {
    inner: InMemoryStore<TodoItem>,
    conflict: bool,
}

impl Store<TodoItem> for RefusingStore {
    async fn list(&self) -> Result<Vec<TodoItem>, StoreError> {
        self.inner.list().await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<TodoItem>, StoreError> {
        self.inner.get_by_id(id).await
    }

    async fn commit(&self, changes: Vec<Change<TodoItem>>) -> Result<(), StoreError> {
        let id = match &changes[0] {
            Change::Add(todo) | Change::Update(todo) | Change::Delete(todo) => todo.id,
        };
        if self.conflict {
            Err(StoreError::conflict::<TodoItem>(id))
        } else {
            Err(StoreError::database("disk I/O error"))
        }
    }
}

async fn refusing_router(conflict: bool) -> (Router, Uuid) {
    let inner = InMemoryStore::new();
    let seeded = create(&app(&AppConfig::with_api_key(KEY), inner.clone()), json!({ "title": "seed" })).await;
    let store = RefusingStore { inner, conflict };
    (app(&AppConfig::with_api_key(KEY), store), seeded.id)
}

#[tokio::test]
async fn commit_conflict_is_409() {
    let (router, id) = refusing_router(true).await;
    let uri = format!("/Todos/{id}");

    let resp = router
        .clone()
        .oneshot(json_request("PUT", &uri, r#"{"title":"x"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.message, CONFLICT_MESSAGE);

    let resp = router.oneshot(request("DELETE", &uri)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn database_failure_is_generic_500() {
    let (router, _) = refusing_router(false).await;
    let resp = router
        .oneshot(json_request("POST", "/Todos", r#"{"title":"x"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = body_json(resp).await;
    assert_eq!(body.message, DATABASE_MESSAGE);
    assert!(!body.message.contains("disk"));
}
