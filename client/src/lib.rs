//! Client/session core for the remote todo API.
//!
//! # Overview
//! Authenticates a user against the API, persists the resulting bearer token
//! and user id in a [`SessionStore`], and proxies todo CRUD calls with the
//! stored token attached. The presentation layer (screens, navigation,
//! notifications) lives elsewhere and talks to the two services.
//!
//! # Design
//! - [`ApiClient`] splits each operation into `build_*` (produces an
//!   [`HttpRequest`]) and `parse_*` (consumes an [`HttpResponse`]); the
//!   [`Transport`] seam executes the round-trip, so everything above it is
//!   deterministic and testable without a server.
//! - [`AccountService`] and [`TodoService`] own the user-facing contracts:
//!   response validation, session writes, precondition checks, and the
//!   mapping of every failure to a displayable string.
//! - The session store is injected, never a process-wide singleton; tests
//!   run against [`MemorySessionStore`], real callers use
//!   [`FileSessionStore`].

pub mod account;
pub mod client;
pub mod error;
pub mod http;
pub mod session;
pub mod todos;
pub mod types;

#[cfg(test)]
mod testing;

pub use account::AccountService;
pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, TransportError, UreqTransport};
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};
pub use todos::TodoService;
pub use types::{LoginRequest, RegisterRequest, TodoDraft, TodoItem, UserResponse};
