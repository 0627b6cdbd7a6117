//! Todo list orchestration for the current session.
//!
//! # Design
//! Every operation requires an active session and fails locally — before any
//! network traffic — with "User ID is missing" when there is none. Mutations
//! follow a mutate-then-refresh pattern: after a successful create or update
//! the service re-runs `fetch_todos` so the published list carries the
//! server-assigned fields. Fetch errors propagate to the caller (the same
//! policy as mutations) and leave the previously published list in place.

use std::sync::{Arc, Mutex, PoisonError};

use crate::client::ApiClient;
use crate::error::user_message;
use crate::session::SessionStore;
use crate::types::{TodoDraft, TodoItem};

/// Precondition failure: an operation was attempted without a session.
const MISSING_USER_ID: &str = "User ID is missing";

pub struct TodoService {
    client: Arc<ApiClient>,
    session: Arc<dyn SessionStore>,
    todos: Mutex<Vec<TodoItem>>,
}

impl TodoService {
    pub fn new(client: Arc<ApiClient>, session: Arc<dyn SessionStore>) -> Self {
        Self {
            client,
            session,
            todos: Mutex::new(Vec::new()),
        }
    }

    /// The most recently fetched list.
    pub fn todos(&self) -> Vec<TodoItem> {
        self.todos
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fetch the current user's todos and publish them as current state.
    /// On error the previously published list is kept.
    pub fn fetch_todos(&self) -> Result<Vec<TodoItem>, String> {
        let session = self.session.get().ok_or(MISSING_USER_ID)?;
        let fetched = self
            .client
            .list_todos(&session.user_id)
            .map_err(|e| user_message(&e))?;
        *self.todos.lock().unwrap_or_else(PoisonError::into_inner) = fetched.clone();
        Ok(fetched)
    }

    /// Create a todo, then refresh the published list.
    pub fn create_todo(&self, description: &str) -> Result<(), String> {
        let session = self.session.get().ok_or(MISSING_USER_ID)?;
        let draft = TodoDraft::create(description);
        self.client
            .create_todo(&session.user_id, &draft)
            .map_err(|e| user_message(&e))?;
        self.fetch_todos()?;
        Ok(())
    }

    /// Update a todo's description and completion flag, then refresh the
    /// published list.
    pub fn update_todo_status(
        &self,
        todo_id: u64,
        description: &str,
        completed: bool,
    ) -> Result<(), String> {
        let session = self.session.get().ok_or(MISSING_USER_ID)?;
        let draft = TodoDraft::update(todo_id, description, completed);
        self.client
            .update_todo(&session.user_id, todo_id, &draft)
            .map_err(|e| user_message(&e))?;
        self.fetch_todos()?;
        Ok(())
    }

    /// Clear the session unconditionally. No server call, no token
    /// revocation.
    pub fn logout(&self) {
        self.session.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{MemorySessionStore, Session};
    use crate::testing::FakeTransport;

    fn service() -> (TodoService, Arc<MemorySessionStore>, Arc<FakeTransport>) {
        let store = Arc::new(MemorySessionStore::new());
        let transport = FakeTransport::new();
        let client = Arc::new(ApiClient::new(
            "http://localhost:4000",
            "test-key",
            store.clone(),
            transport.clone(),
        ));
        (TodoService::new(client, store.clone()), store, transport)
    }

    fn authenticated() -> (TodoService, Arc<MemorySessionStore>, Arc<FakeTransport>) {
        let (service, store, transport) = service();
        store.set(Session {
            token: "abc".to_string(),
            user_id: "7".to_string(),
        });
        (service, store, transport)
    }

    const MILK: &str =
        r#"{"id":1,"user_id":7,"description":"milk","completed":0,"author":"Ann","meta":null}"#;

    #[test]
    fn fetch_without_session_fails_without_network_call() {
        let (service, _store, transport) = service();
        let err = service.fetch_todos().unwrap_err();
        assert_eq!(err, "User ID is missing");
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn create_without_session_fails_without_network_call() {
        let (service, _store, transport) = service();
        let err = service.create_todo("milk").unwrap_err();
        assert_eq!(err, "User ID is missing");
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn update_without_session_fails_without_network_call() {
        let (service, _store, transport) = service();
        let err = service.update_todo_status(1, "milk", true).unwrap_err();
        assert_eq!(err, "User ID is missing");
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn fetch_publishes_the_list() {
        let (service, _store, transport) = authenticated();
        transport.push_response(200, &format!("[{MILK}]"));

        let todos = service.fetch_todos().unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].description, "milk");
        assert!(!todos[0].completed);
        assert_eq!(service.todos(), todos);
    }

    #[test]
    fn fetch_error_propagates_and_keeps_prior_state() {
        let (service, _store, transport) = authenticated();
        transport.push_response(200, &format!("[{MILK}]"));
        service.fetch_todos().unwrap();

        transport.push_response(500, r#"{"message":"boom"}"#);
        let err = service.fetch_todos().unwrap_err();
        assert_eq!(err, "HTTP 500: boom");
        assert_eq!(service.todos().len(), 1);
    }

    #[test]
    fn create_sends_empty_id_draft_and_refreshes() {
        let (service, _store, transport) = authenticated();
        transport.push_response(
            201,
            r#"{"description":"milk","completed":false,"user_id":7,"author":"Ann","id":1,"meta":null}"#,
        );
        transport.push_response(200, &format!("[{MILK}]"));

        service.create_todo("milk").unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        let body: serde_json::Value =
            serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["id"], "");
        assert_eq!(body["description"], "milk");
        assert_eq!(body["completed"], false);
        assert!(requests[1].path.contains("/api/users/7/todos"));
        assert_eq!(service.todos().len(), 1);
    }

    #[test]
    fn update_addresses_todo_and_refreshes() {
        let (service, _store, transport) = authenticated();
        transport.push_response(
            200,
            r#"{"description":"milk","completed":true,"user_id":7,"author":"Ann","id":1,"meta":null}"#,
        );
        transport.push_response(
            200,
            r#"[{"id":1,"user_id":7,"description":"milk","completed":1,"author":"Ann","meta":null}]"#,
        );

        service.update_todo_status(1, "milk", true).unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].path.contains("/api/users/7/todos/1"));
        let body: serde_json::Value =
            serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["id"], "1");
        assert_eq!(body["completed"], true);
        assert!(service.todos()[0].completed);
    }

    #[test]
    fn failed_create_propagates_server_message() {
        let (service, _store, transport) = authenticated();
        transport.push_response(400, r#"{"message":"description required"}"#);

        let err = service.create_todo("").unwrap_err();
        assert_eq!(err, "HTTP 400: description required");
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn logout_clears_session_and_blocks_further_calls() {
        let (service, store, transport) = authenticated();
        service.logout();
        assert!(store.get().is_none());

        let err = service.fetch_todos().unwrap_err();
        assert_eq!(err, "User ID is missing");
        assert_eq!(transport.request_count(), 0);
    }
}
