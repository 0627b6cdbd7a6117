//! In-process stand-in for the live todo API, used by integration tests.
//!
//! # Design
//! Reproduces the live service's observable behavior, including its wire
//! quirks, so the client's normalization paths are exercised for real:
//! - every route requires an `apikey` query parameter;
//! - todo routes additionally require `Authorization: Bearer <token>` for
//!   the user addressed in the path;
//! - login responses encode `enabled`/`admin` as integers, register
//!   responses as booleans;
//! - list responses encode `completed` as 0/1 integers, create/update
//!   responses as booleans.
//!
//! Responses are assembled with `json!` rather than serde structs precisely
//! because these asymmetries are the point.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// The API key every request must present as `?apikey=`.
pub const API_KEY: &str = "test-api-key";

#[derive(Clone, Debug)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub token: String,
}

#[derive(Clone, Debug)]
pub struct TodoRecord {
    pub id: u64,
    pub user_id: u64,
    pub description: String,
    pub completed: bool,
    pub author: String,
    pub meta: Option<String>,
}

#[derive(Default)]
struct Store {
    users: Vec<User>,
    todos: Vec<TodoRecord>,
    next_user_id: u64,
    next_todo_id: u64,
}

type Db = Arc<RwLock<Store>>;

#[derive(Deserialize)]
struct ApiKeyQuery {
    apikey: Option<String>,
}

#[derive(Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

/// Write-side todo payload: `id` is ignored on create (the server assigns
/// one) and redundant with the path on update, mirroring the live API.
#[derive(Deserialize)]
struct DraftBody {
    #[serde(default)]
    #[allow(dead_code)]
    id: String,
    description: String,
    completed: bool,
}

type ApiResult = Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/api/users/login", post(login))
        .route("/api/users/register", post(register))
        .route("/api/users/{user_id}/todos", get(list_todos).post(create_todo))
        .route("/api/users/{user_id}/todos/{todo_id}", put(update_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn reject(status: StatusCode, message: &str) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "message": message })))
}

fn check_api_key(query: &ApiKeyQuery) -> Result<(), (StatusCode, Json<Value>)> {
    match query.apikey.as_deref() {
        Some(API_KEY) => Ok(()),
        _ => Err(reject(StatusCode::UNAUTHORIZED, "invalid api key")),
    }
}

/// Todo routes also require the bearer token of the addressed user.
fn check_bearer(headers: &HeaderMap, user: &User) -> Result<(), (StatusCode, Json<Value>)> {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if authorization == format!("Bearer {}", user.token) {
        Ok(())
    } else {
        Err(reject(StatusCode::UNAUTHORIZED, "missing or invalid token"))
    }
}

async fn register(
    State(db): State<Db>,
    Query(query): Query<ApiKeyQuery>,
    Json(body): Json<RegisterBody>,
) -> ApiResult {
    check_api_key(&query)?;
    let mut store = db.write().await;
    if store.users.iter().any(|u| u.email == body.email) {
        return Err(reject(StatusCode::BAD_REQUEST, "email already exists"));
    }
    store.next_user_id += 1;
    let user = User {
        id: store.next_user_id,
        name: body.name,
        email: body.email,
        password: body.password,
        token: Uuid::new_v4().to_string(),
    };
    store.users.push(user.clone());

    // Register encodes the flags as booleans.
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "enabled": true,
            "token": user.token,
            "admin": false,
        })),
    ))
}

async fn login(
    State(db): State<Db>,
    Query(query): Query<ApiKeyQuery>,
    Json(body): Json<LoginBody>,
) -> ApiResult {
    check_api_key(&query)?;
    let store = db.read().await;
    let user = store
        .users
        .iter()
        .find(|u| u.email == body.email && u.password == body.password)
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "invalid credentials"))?;

    // Login encodes the flags as integers.
    Ok((
        StatusCode::OK,
        Json(json!({
            "id": user.id,
            "name": user.name,
            "email": user.email,
            "enabled": 1,
            "token": user.token,
            "admin": 0,
        })),
    ))
}

async fn list_todos(
    State(db): State<Db>,
    Path(user_id): Path<u64>,
    Query(query): Query<ApiKeyQuery>,
    headers: HeaderMap,
) -> ApiResult {
    check_api_key(&query)?;
    let store = db.read().await;
    let user = find_user(&store, user_id)?;
    check_bearer(&headers, user)?;

    // List responses encode `completed` as 0/1.
    let todos: Vec<Value> = store
        .todos
        .iter()
        .filter(|t| t.user_id == user_id)
        .map(|t| {
            json!({
                "id": t.id,
                "user_id": t.user_id,
                "description": t.description,
                "completed": i32::from(t.completed),
                "author": t.author,
                "meta": t.meta,
            })
        })
        .collect();
    Ok((StatusCode::OK, Json(Value::Array(todos))))
}

async fn create_todo(
    State(db): State<Db>,
    Path(user_id): Path<u64>,
    Query(query): Query<ApiKeyQuery>,
    headers: HeaderMap,
    Json(body): Json<DraftBody>,
) -> ApiResult {
    check_api_key(&query)?;
    let mut store = db.write().await;
    let user = find_user(&store, user_id)?.clone();
    check_bearer(&headers, &user)?;

    store.next_todo_id += 1;
    let todo = TodoRecord {
        id: store.next_todo_id,
        user_id,
        description: body.description,
        completed: body.completed,
        author: user.name,
        meta: None,
    };
    store.todos.push(todo.clone());
    Ok((StatusCode::CREATED, Json(todo_write_response(&todo))))
}

async fn update_todo(
    State(db): State<Db>,
    Path((user_id, todo_id)): Path<(u64, u64)>,
    Query(query): Query<ApiKeyQuery>,
    headers: HeaderMap,
    Json(body): Json<DraftBody>,
) -> ApiResult {
    check_api_key(&query)?;
    let mut store = db.write().await;
    let user = find_user(&store, user_id)?.clone();
    check_bearer(&headers, &user)?;

    let todo = store
        .todos
        .iter_mut()
        .find(|t| t.id == todo_id && t.user_id == user_id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "todo not found"))?;
    todo.description = body.description;
    todo.completed = body.completed;
    let todo = todo.clone();
    Ok((StatusCode::OK, Json(todo_write_response(&todo))))
}

fn find_user(store: &Store, user_id: u64) -> Result<&User, (StatusCode, Json<Value>)> {
    store
        .users
        .iter()
        .find(|u| u.id == user_id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "user not found"))
}

/// Create/update responses encode `completed` as a boolean.
fn todo_write_response(todo: &TodoRecord) -> Value {
    json!({
        "description": todo.description,
        "completed": todo.completed,
        "user_id": todo.user_id,
        "author": todo.author,
        "id": todo.id,
        "meta": todo.meta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_body_defaults_empty_id() {
        let body: DraftBody =
            serde_json::from_str(r#"{"description":"milk","completed":false}"#).unwrap();
        assert_eq!(body.id, "");
        assert_eq!(body.description, "milk");
    }

    #[test]
    fn draft_body_rejects_missing_description() {
        let result: Result<DraftBody, _> = serde_json::from_str(r#"{"completed":true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn write_response_encodes_completed_as_bool() {
        let todo = TodoRecord {
            id: 1,
            user_id: 7,
            description: "milk".to_string(),
            completed: true,
            author: "Ann".to_string(),
            meta: None,
        };
        let value = todo_write_response(&todo);
        assert_eq!(value["completed"], true);
        assert_eq!(value["user_id"], 7);
        assert_eq!(value["meta"], Value::Null);
    }
}
