//! Login and registration orchestration.
//!
//! # Design
//! The service validates the server's response before trusting it: a 2xx
//! with an empty token or a zero id is treated as invalid and the session
//! store is left untouched. Only a validated response writes the session.
//! Errors surface as user-displayable strings; no field-level input
//! validation happens here (presentation concern).

use std::sync::Arc;

use crate::client::ApiClient;
use crate::error::user_message;
use crate::session::{Session, SessionStore};
use crate::types::{LoginRequest, RegisterRequest, UserResponse};

pub struct AccountService {
    client: Arc<ApiClient>,
    session: Arc<dyn SessionStore>,
}

impl AccountService {
    pub fn new(client: Arc<ApiClient>, session: Arc<dyn SessionStore>) -> Self {
        Self { client, session }
    }

    /// Log in and persist the resulting session.
    ///
    /// Requires the response to carry a non-empty token and a non-zero id;
    /// otherwise fails with "Invalid login response" and leaves the store
    /// unchanged.
    pub fn login(&self, email: &str, password: &str) -> Result<(), String> {
        let credentials = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .login(&credentials)
            .map_err(|e| user_message(&e))?;
        self.persist(response, "Invalid login response")
    }

    /// Create an account and persist the resulting session. Same validity
    /// contract as [`login`](Self::login).
    pub fn register(&self, name: &str, email: &str, password: &str) -> Result<(), String> {
        let credentials = RegisterRequest {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .register(&credentials)
            .map_err(|e| user_message(&e))?;
        self.persist(response, "Invalid create account response")
    }

    fn persist(&self, response: UserResponse, invalid: &str) -> Result<(), String> {
        if response.token.is_empty() || response.id == 0 {
            return Err(invalid.to_string());
        }
        self.session.set(Session {
            token: response.token,
            user_id: response.id.to_string(),
        });
        Ok(())
    }
}
