//! Wire DTOs for the todo API.
//!
//! # Design
//! These types mirror the remote API's schema but are defined independently
//! of the mock-server crate; integration tests catch schema drift. The live
//! API is inconsistent about how it encodes flags: login responses carry
//! `enabled`/`admin` as integers while register responses carry booleans, and
//! list responses carry `completed` as an integer (0/1) while create/update
//! responses carry a boolean. `flag_from_any` accepts both encodings and
//! normalizes to `bool` on read, so callers never see the asymmetry.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Login request payload. Transient, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request payload. Transient, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// User record returned by both login and register.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct UserResponse {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(deserialize_with = "flag_from_any")]
    pub enabled: bool,
    pub token: String,
    #[serde(deserialize_with = "flag_from_any")]
    pub admin: bool,
}

/// A todo item as surfaced to callers, `completed` already normalized.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TodoItem {
    pub id: u64,
    pub user_id: u64,
    pub description: String,
    #[serde(deserialize_with = "flag_from_any")]
    pub completed: bool,
    pub author: String,
    #[serde(default)]
    pub meta: Option<String>,
}

/// Write-side todo payload. `id` is the empty string for creates and the
/// decimal todo id for updates — the server keys on it.
#[derive(Debug, Clone, Serialize)]
pub struct TodoDraft {
    pub id: String,
    pub description: String,
    pub completed: bool,
}

impl TodoDraft {
    /// Draft for a new todo: empty id, not completed.
    pub fn create(description: impl Into<String>) -> Self {
        Self {
            id: String::new(),
            description: description.into(),
            completed: false,
        }
    }

    /// Draft for updating an existing todo.
    pub fn update(id: u64, description: impl Into<String>, completed: bool) -> Self {
        Self {
            id: id.to_string(),
            description: description.into(),
            completed,
        }
    }
}

/// Accept a boolean or an integer; integers map to `value != 0`.
fn flag_from_any<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    struct FlagVisitor;

    impl Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a boolean or an integer flag")
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<bool, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<bool, E> {
            Ok(v != 0)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<bool, E> {
            Ok(v != 0)
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}
