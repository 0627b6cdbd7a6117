//! Request builder, response parser, and executing wrappers for the five
//! API operations.
//!
//! # Design
//! Each operation is split into a `build_*` method that produces an
//! [`HttpRequest`] and a `parse_*` method that consumes an [`HttpResponse`],
//! with a thin executing wrapper gluing them through the injected
//! [`Transport`]. The split keeps request shapes and status handling
//! testable without a server. The bearer token is read from the session
//! store at call time — an empty token still produces an `Authorization`
//! header, matching the live API's expectations.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::session::SessionStore;
use crate::types::{LoginRequest, RegisterRequest, TodoDraft, TodoItem, UserResponse};

/// Base URL of the live API.
pub const DEFAULT_BASE_URL: &str = "https://todos.simpleapi.dev";

/// Client for the todo API: fixed base URL, static API key sent as a query
/// parameter on every call, bearer token read from the session store.
pub struct ApiClient {
    base_url: String,
    api_key: String,
    session: Arc<dyn SessionStore>,
    transport: Arc<dyn Transport>,
}

impl ApiClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        session: Arc<dyn SessionStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            session,
            transport,
        }
    }

    /// `POST /api/users/login`. Non-2xx maps to [`ApiError::Auth`].
    pub fn login(&self, credentials: &LoginRequest) -> Result<UserResponse, ApiError> {
        let request = self.build_login(credentials)?;
        let response = self.transport.send(&request)?;
        self.parse_login(response)
    }

    /// `POST /api/users/register`. Non-2xx maps to [`ApiError::Validation`].
    pub fn register(&self, credentials: &RegisterRequest) -> Result<UserResponse, ApiError> {
        let request = self.build_register(credentials)?;
        let response = self.transport.send(&request)?;
        self.parse_register(response)
    }

    /// `GET /api/users/{user_id}/todos`. Integer `completed` fields are
    /// normalized to booleans during deserialization.
    pub fn list_todos(&self, user_id: &str) -> Result<Vec<TodoItem>, ApiError> {
        let request = self.build_list_todos(user_id);
        let response = self.transport.send(&request)?;
        self.parse_list_todos(response)
    }

    /// `POST /api/users/{user_id}/todos`.
    pub fn create_todo(&self, user_id: &str, draft: &TodoDraft) -> Result<TodoItem, ApiError> {
        let request = self.build_create_todo(user_id, draft)?;
        let response = self.transport.send(&request)?;
        self.parse_create_todo(response)
    }

    /// `PUT /api/users/{user_id}/todos/{todo_id}`.
    pub fn update_todo(
        &self,
        user_id: &str,
        todo_id: u64,
        draft: &TodoDraft,
    ) -> Result<TodoItem, ApiError> {
        let request = self.build_update_todo(user_id, todo_id, draft)?;
        let response = self.transport.send(&request)?;
        self.parse_update_todo(response)
    }

    pub fn build_login(&self, credentials: &LoginRequest) -> Result<HttpRequest, ApiError> {
        self.build_json(HttpMethod::Post, "/api/users/login", credentials)
    }

    pub fn build_register(&self, credentials: &RegisterRequest) -> Result<HttpRequest, ApiError> {
        self.build_json(HttpMethod::Post, "/api/users/register", credentials)
    }

    pub fn build_list_todos(&self, user_id: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.url(&format!("/api/users/{user_id}/todos")),
            headers: self.headers(false),
            body: None,
        }
    }

    pub fn build_create_todo(
        &self,
        user_id: &str,
        draft: &TodoDraft,
    ) -> Result<HttpRequest, ApiError> {
        self.build_json(HttpMethod::Post, &format!("/api/users/{user_id}/todos"), draft)
    }

    pub fn build_update_todo(
        &self,
        user_id: &str,
        todo_id: u64,
        draft: &TodoDraft,
    ) -> Result<HttpRequest, ApiError> {
        self.build_json(
            HttpMethod::Put,
            &format!("/api/users/{user_id}/todos/{todo_id}"),
            draft,
        )
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<UserResponse, ApiError> {
        if !is_success(response.status) {
            return Err(ApiError::Auth {
                status: response.status,
                message: server_message(&response),
            });
        }
        decode(&response.body)
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<UserResponse, ApiError> {
        if !is_success(response.status) {
            return Err(ApiError::Validation {
                status: response.status,
                message: server_message(&response),
            });
        }
        decode(&response.body)
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<TodoItem>, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<TodoItem, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    pub fn parse_update_todo(&self, response: HttpResponse) -> Result<TodoItem, ApiError> {
        check_status(&response)?;
        decode(&response.body)
    }

    fn build_json<T: Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        payload: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: self.url(path),
            headers: self.headers(true),
            body: Some(body),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}?apikey={}", self.base_url, path, self.api_key)
    }

    /// Headers for every request: the bearer token as currently stored
    /// (empty before login), plus a content type when a body follows.
    fn headers(&self, with_body: bool) -> Vec<(String, String)> {
        let token = self.session.get().map(|s| s.token).unwrap_or_default();
        let mut headers = vec![("authorization".to_string(), format!("Bearer {token}"))];
        if with_body {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        headers
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if is_success(response.status) {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        message: server_message(response),
    })
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

/// Best-effort extraction of the server's error message: a JSON `message`
/// field when present, otherwise the raw body, otherwise the status line.
fn server_message(response: &HttpResponse) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(&response.body) {
        return parsed.message;
    }
    let trimmed = response.body.trim();
    if trimmed.is_empty() {
        format!("HTTP {}", response.status)
    } else {
        trimmed.to_string()
    }
}
