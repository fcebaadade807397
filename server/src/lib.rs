//! TODO item HTTP service.
//!
//! [`app`] assembles the router over any [`Store`] of [`TodoItem`]s, so the
//! same pipeline serves SQLite in production and an in-memory table in tests.
//! Layer order, outermost first: panic catcher, JSON error normaliser, CORS,
//! API-key gate, routes.

pub mod config;
pub mod docs;
pub mod dto;
pub mod error;
pub mod gate;
pub mod handlers;
pub mod mapping;
pub mod middleware;
pub mod model;
pub mod repository;
pub mod store;
pub mod validation;

use axum::{middleware as axum_middleware, routing::get, Router};
use tokio::net::TcpListener;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
};

use crate::config::AppConfig;
use crate::gate::ApiKeyGate;
use crate::handlers::AppState;
use crate::model::TodoItem;
use crate::repository::Store;

pub use crate::handlers::TODOS_PATH;

pub fn app<S: Store<TodoItem>>(config: &AppConfig, store: S) -> Router {
    let api_key_gate = ApiKeyGate::new(&config.api_key);

    Router::new()
        .route(
            TODOS_PATH,
            get(handlers::list_todos::<S>).post(handlers::create_todo::<S>),
        )
        .route(
            "/Todos/{id}",
            get(handlers::get_todo::<S>)
                .put(handlers::update_todo::<S>)
                .delete(handlers::delete_todo::<S>),
        )
        .route("/health", get(handlers::health))
        .route(docs::OPENAPI_PATH, get(docs::openapi))
        .with_state(AppState::new(store))
        .layer(axum_middleware::from_fn_with_state(api_key_gate, gate::require_api_key))
        .layer(cors_layer(config))
        .layer(axum_middleware::from_fn(middleware::normalize_error_body))
        .layer(CatchPanicLayer::custom(middleware::handle_panic))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.allowed_origins.clone()))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

pub async fn run(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}
