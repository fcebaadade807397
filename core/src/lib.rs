//! Synchronous API client core for the todo service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The caller executes the
//! actual HTTP round-trip, making the core fully deterministic and testable.
//! On top of the client sit the pieces a front end needs: the optimistic
//! [`TodoBoard`], the shared [`TodoForm`] and a [`Debounce`] for re-fetches.
//!
//! # Design
//! - `TodoClient` is stateless; it holds only `base_url` and the API key.
//! - Each CRUD operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - DTOs are defined independently from the server crate; integration
//!   tests catch schema drift.

pub mod board;
pub mod client;
pub mod config;
pub mod debounce;
pub mod error;
pub mod form;
pub mod http;
pub mod types;

pub use board::{Filter, PendingToggle, Resync, Summary, TodoBoard};
pub use client::TodoClient;
pub use config::{ClientConfig, ConfigError};
pub use debounce::Debounce;
pub use error::{ApiError, FieldErrors};
pub use form::TodoForm;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{CreateTodo, Todo, UpdateTodo};
