// In-process stand-in for the bug tracker backend, served with axum on a
// random local port. Mirrors the real API's routes, roles and error bodies.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

pub const PASSWORD: &str = "password123";
const TIMESTAMP: &str = "2025-04-28T12:30:00Z";
const UPDATED: &str = "2025-04-29T08:00:00Z";

pub struct TestUser {
    pub id: &'static str,
    pub name: &'static str,
    pub email: &'static str,
    pub role: &'static str,
    pub token: &'static str,
}

pub const DEV: TestUser = TestUser {
    id: "64b000000000000000000001",
    name: "Dev One",
    email: "dev@example.com",
    role: "developer",
    token: "dev-token",
};

pub const OTHER_DEV: TestUser = TestUser {
    id: "64b000000000000000000002",
    name: "Dev Two",
    email: "dev2@example.com",
    role: "developer",
    token: "dev2-token",
};

pub const MANAGER: TestUser = TestUser {
    id: "64b000000000000000000003",
    name: "Mia Manager",
    email: "manager@example.com",
    role: "manager",
    token: "manager-token",
};

pub const ADMIN: TestUser = TestUser {
    id: "64b000000000000000000004",
    name: "Ada Admin",
    email: "admin@example.com",
    role: "admin",
    token: "admin-token",
};

const USERS: [&TestUser; 4] = [&DEV, &OTHER_DEV, &MANAGER, &ADMIN];

impl TestUser {
    pub fn json(&self) -> Value {
        json!({ "id": self.id, "name": self.name, "email": self.email, "role": self.role })
    }

    fn sees_everything(&self) -> bool {
        self.role == "manager" || self.role == "admin"
    }
}

#[derive(Default)]
pub struct Backend {
    pub bugs: Vec<Value>,
    pub requests: Vec<String>,
    next_id: u64,
    /// Tokens the server no longer accepts.
    pub revoked: Vec<String>,
}

type Shared = Arc<Mutex<Backend>>;

pub struct MockServer {
    pub base_url: String,
    pub backend: Shared,
}

impl MockServer {
    pub fn bug(&self, id: &str) -> Option<Value> {
        self.backend
            .lock()
            .unwrap()
            .bugs
            .iter()
            .find(|b| b["id"] == id)
            .cloned()
    }

    pub fn revoke(&self, token: &str) {
        self.backend.lock().unwrap().revoked.push(token.to_string());
    }

    pub fn requests(&self) -> Vec<String> {
        self.backend.lock().unwrap().requests.clone()
    }
}

/// A bug record in the shape the backend sends it.
pub fn seed_bug(id: &str, title: &str, status: &str, assignee: Option<&TestUser>) -> Value {
    let mut bug = json!({
        "id": id,
        "title": title,
        "description": format!("{} description", title),
        "status": status,
        "priority": "medium",
        "reported_by": MANAGER.json(),
        "created_at": TIMESTAMP,
        "updated_at": TIMESTAMP,
    });
    if let Some(user) = assignee {
        bug["assigned_to"] = user.json();
    }
    bug
}

pub async fn spawn(bugs: Vec<Value>) -> MockServer {
    let backend = Arc::new(Mutex::new(Backend {
        bugs,
        next_id: 0x100,
        ..Backend::default()
    }));

    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/developers", get(developers))
        .route("/bugs", get(list_bugs).post(create_bug))
        .route(
            "/bugs/{id}",
            get(get_bug).put(update_bug).delete(delete_bug),
        )
        .route("/bugs/{id}/status", patch(update_status))
        .route("/bugs/{id}/assign", post(assign_bug));

    let app = Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    MockServer {
        base_url: format!("http://{}/api", addr),
        backend,
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn record(backend: &Shared, line: String) {
    backend.lock().unwrap().requests.push(line);
}

fn caller(backend: &Shared, headers: &HeaderMap) -> Result<&'static TestUser, Response> {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    let Some(token) = token else {
        return Err(error(StatusCode::UNAUTHORIZED, "Authorization header is required"));
    };
    if backend.lock().unwrap().revoked.iter().any(|t| t == token) {
        return Err(error(StatusCode::UNAUTHORIZED, "Invalid or expired token"));
    }
    USERS
        .into_iter()
        .find(|u| u.token == token)
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Invalid or expired token"))
}

fn not_found() -> Response {
    error(StatusCode::NOT_FOUND, "Bug not found")
}

async fn login(State(backend): State<Shared>, Json(body): Json<Value>) -> Response {
    record(&backend, "POST /auth/login".into());
    let user = USERS
        .into_iter()
        .find(|u| body["email"] == u.email && body["password"] == PASSWORD);
    match user {
        Some(user) => Json(json!({ "token": user.token, "user": user.json() })).into_response(),
        None => error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

async fn register(State(backend): State<Shared>, Json(body): Json<Value>) -> Response {
    record(&backend, "POST /auth/register".into());
    if USERS.into_iter().any(|u| body["email"] == u.email) {
        return error(StatusCode::BAD_REQUEST, "User already exists");
    }
    let user = json!({
        "id": "64b0000000000000000000ff",
        "name": body["name"],
        "email": body["email"],
        "role": body["role"],
    });
    (StatusCode::CREATED, Json(json!({ "user": user }))).into_response()
}

async fn developers(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    record(&backend, "GET /auth/developers".into());
    if let Err(resp) = caller(&backend, &headers) {
        return resp;
    }
    let devs: Vec<Value> = USERS
        .into_iter()
        .filter(|u| u.role == "developer")
        .map(TestUser::json)
        .collect();
    Json(devs).into_response()
}

async fn list_bugs(State(backend): State<Shared>, headers: HeaderMap) -> Response {
    record(&backend, "GET /bugs".into());
    let user = match caller(&backend, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let state = backend.lock().unwrap();
    let bugs: Vec<Value> = state
        .bugs
        .iter()
        .filter(|b| user.sees_everything() || b["assigned_to"]["id"] == user.id)
        .cloned()
        .collect();
    if bugs.is_empty() {
        // The real backend serializes an empty result as null
        return Json(Value::Null).into_response();
    }
    Json(bugs).into_response()
}

async fn get_bug(
    State(backend): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    record(&backend, format!("GET /bugs/{}", id));
    if let Err(resp) = caller(&backend, &headers) {
        return resp;
    }
    let state = backend.lock().unwrap();
    match state.bugs.iter().find(|b| b["id"] == id) {
        Some(bug) => Json(bug.clone()).into_response(),
        None => not_found(),
    }
}

async fn create_bug(
    State(backend): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&backend, "POST /bugs".into());
    let user = match caller(&backend, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let priority = body["priority"].as_str().unwrap_or("");
    if !["low", "medium", "high", "critical"].contains(&priority) {
        return error(StatusCode::BAD_REQUEST, "Invalid priority");
    }

    let mut state = backend.lock().unwrap();
    state.next_id += 1;
    let bug = json!({
        "id": format!("{:024x}", state.next_id),
        "title": body["title"],
        "description": body["description"],
        "status": "open",
        "priority": priority,
        "reported_by": user.json(),
        "created_at": TIMESTAMP,
        "updated_at": TIMESTAMP,
    });
    state.bugs.push(bug.clone());
    (StatusCode::CREATED, Json(bug)).into_response()
}

async fn update_bug(
    State(backend): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&backend, format!("PUT /bugs/{}", id));
    let user = match caller(&backend, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let mut state = backend.lock().unwrap();
    let Some(bug) = state.bugs.iter_mut().find(|b| b["id"] == id) else {
        return not_found();
    };
    let involved = bug["reported_by"]["id"] == user.id || bug["assigned_to"]["id"] == user.id;
    if !user.sees_everything() && !involved {
        return error(StatusCode::FORBIDDEN, "unauthorized action");
    }
    for field in ["title", "description", "priority"] {
        if let Some(value) = body[field].as_str().filter(|v| !v.is_empty()) {
            bug[field] = json!(value);
        }
    }
    bug["updated_at"] = json!(UPDATED);
    Json(bug.clone()).into_response()
}

async fn update_status(
    State(backend): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&backend, format!("PATCH /bugs/{}/status", id));
    let user = match caller(&backend, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    let status = body["status"].as_str().unwrap_or("");
    if !["open", "in-progress", "resolved"].contains(&status) {
        return error(StatusCode::BAD_REQUEST, "Invalid status");
    }
    let mut state = backend.lock().unwrap();
    let Some(bug) = state.bugs.iter_mut().find(|b| b["id"] == id) else {
        return not_found();
    };
    if bug["assigned_to"]["id"] != user.id {
        return error(StatusCode::FORBIDDEN, "Only the assigned developer can update status");
    }
    bug["status"] = json!(status);
    bug["updated_at"] = json!(UPDATED);
    Json(bug.clone()).into_response()
}

async fn assign_bug(
    State(backend): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&backend, format!("POST /bugs/{}/assign", id));
    let user = match caller(&backend, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    if !user.sees_everything() {
        return error(StatusCode::FORBIDDEN, "Only managers can assign bugs");
    }
    let Some(developer) = USERS.into_iter().find(|u| body["developer_id"] == u.id) else {
        return error(StatusCode::BAD_REQUEST, "Developer not found");
    };
    if developer.role != "developer" {
        return error(StatusCode::BAD_REQUEST, "invalid developer role");
    }
    let mut state = backend.lock().unwrap();
    let Some(bug) = state.bugs.iter_mut().find(|b| b["id"] == id) else {
        return not_found();
    };
    bug["assigned_to"] = developer.json();
    bug["updated_at"] = json!(UPDATED);
    Json(bug.clone()).into_response()
}

async fn delete_bug(
    State(backend): State<Shared>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    record(&backend, format!("DELETE /bugs/{}", id));
    let user = match caller(&backend, &headers) {
        Ok(user) => user,
        Err(resp) => return resp,
    };
    if !user.sees_everything() {
        return error(StatusCode::FORBIDDEN, "Only managers can delete bugs");
    }
    let mut state = backend.lock().unwrap();
    let before = state.bugs.len();
    state.bugs.retain(|b| b["id"] != id);
    if state.bugs.len() == before {
        return not_found();
    }
    Json(json!({ "message": "Bug deleted successfully" })).into_response()
}
