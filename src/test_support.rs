//! In-process fake of the EducaMais REST backend and auth provider
//!
//! Served by axum on an ephemeral port so the reqwest clients run against a
//! real socket. Resources are plain JSON values in the backend's own shape.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, RawQuery, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::config::{BackendConfig, Config};

pub const COOKIE_NAME: &str = "better-auth.session_token";

#[derive(Debug, Clone)]
struct Account {
    user: Value,
    password: String,
}

#[derive(Default)]
pub struct FakeState {
    posts: Mutex<Vec<Value>>,
    accounts: Mutex<Vec<Account>>,
    sessions: Mutex<HashMap<String, String>>,
    requests: Mutex<Vec<String>>,
    next_id: AtomicI64,
    /// List endpoints answer 500 while set
    pub fail_lists: AtomicBool,
    /// Every authenticated endpoint answers 401 SESSION_EXPIRED while set
    pub expire_sessions: AtomicBool,
}

/// Handle to a running fake backend
pub struct FakeBackend {
    pub base_url: String,
    pub state: Arc<FakeState>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState {
            next_id: AtomicI64::new(100),
            ..Default::default()
        });

        let router = Router::new()
            .route("/posts", get(list_posts).post(create_post))
            .route("/posts/search", get(search_posts))
            .route("/posts/user/{id}", get(posts_by_author))
            .route("/posts/{id}", get(get_post).put(update_post).delete(delete_post))
            .route("/users", get(list_users).post(create_user))
            .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
            .route("/api/auth/sign-in/email", post(sign_in))
            .route("/api/auth/sign-up/email", post(sign_up))
            .route("/api/auth/sign-out", post(sign_out))
            .route("/api/auth/get-session", get(get_session))
            .layer(middleware::from_fn_with_state(state.clone(), record_request))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Backend section pointing at this fake
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            base_url: self.base_url.clone(),
            timeout_seconds: 5,
        }
    }

    /// Full configuration pointing at this fake
    pub fn config(&self) -> Config {
        Config {
            backend: self.backend_config(),
            ..Default::default()
        }
    }

    /// Register an account and return its id
    pub fn add_account(&self, name: &str, email: &str, password: &str, app_role: &str) -> String {
        let id = self.state.next_id.fetch_add(1, Ordering::SeqCst).to_string();
        let user = json!({
            "id": id,
            "name": name,
            "email": email,
            "role": "user",
            "appRole": app_role,
            "createdAt": "2025-01-15T08:00:00Z",
        });
        self.state.accounts.lock().unwrap().push(Account {
            user,
            password: password.to_string(),
        });
        id
    }

    /// Open a session for an existing account
    pub fn add_session(&self, token: &str, user_id: &str) {
        self.state
            .sessions
            .lock()
            .unwrap()
            .insert(token.to_string(), user_id.to_string());
    }

    /// Account plus session in one go; returns the user id
    pub fn sign_in_as(&self, token: &str, name: &str, app_role: &str) -> String {
        let email = format!("{}@escola.com", name.to_lowercase().replace(' ', "."));
        let id = self.add_account(name, &email, "segredo123", app_role);
        self.add_session(token, &id);
        id
    }

    /// Insert a post and return its id
    pub fn add_post(&self, title: &str, body: &str, author_id: &str) -> i64 {
        let id = self.state.next_id.fetch_add(1, Ordering::SeqCst);
        let author = self.account_json(author_id);
        let author_num: i64 = author_id.parse().unwrap_or(0);
        self.state.posts.lock().unwrap().push(json!({
            "id": id,
            "titulo": title,
            "conteudo": body,
            "autorId": author_num,
            "createdAt": "2025-02-01T10:00:00Z",
            "atualizacao": "2025-02-01T10:00:00Z",
            "autor": {
                "id": author_num,
                "email": author.as_ref().map_or(json!("anon@escola.com"), |a| a["email"].clone()),
                "name": author.as_ref().map_or(Value::Null, |a| a["name"].clone()),
            },
        }));
        id
    }

    pub fn post(&self, id: i64) -> Option<Value> {
        self.state.posts.lock().unwrap().iter().find(|p| p["id"] == id).cloned()
    }

    pub fn post_count(&self) -> usize {
        self.state.posts.lock().unwrap().len()
    }

    pub fn account_json(&self, id: &str) -> Option<Value> {
        self.state
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.user["id"] == id)
            .map(|a| a.user.clone())
    }

    pub fn account_password(&self, id: &str) -> Option<String> {
        self.state
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.user["id"] == id)
            .map(|a| a.password.clone())
    }

    pub fn has_session(&self, token: &str) -> bool {
        self.state.sessions.lock().unwrap().contains_key(token)
    }

    /// Requests seen so far, as `METHOD /path?query`
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn clear_requests(&self) {
        self.state.requests.lock().unwrap().clear();
    }
}

async fn record_request(State(state): State<Arc<FakeState>>, request: Request, next: Next) -> Response {
    let line = match request.uri().query() {
        Some(q) => format!("{} {}?{}", request.method(), request.uri().path(), q),
        None => format!("{} {}", request.method(), request.uri().path()),
    };
    state.requests.lock().unwrap().push(line);
    next.run(request).await
}

fn query_pairs(raw: Option<String>) -> Vec<(String, String)> {
    raw.unwrap_or_default()
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            let decode = |s: &str| {
                urlencoding::decode(&s.replace('+', " "))
                    .map(|c| c.into_owned())
                    .unwrap_or_default()
            };
            (decode(k), decode(v))
        })
        .collect()
}

fn query_u32(pairs: &[(String, String)], key: &str, default: u32) -> u32 {
    pairs
        .iter()
        .find(|(k, _)| k == key)
        .and_then(|(_, v)| v.parse().ok())
        .unwrap_or(default)
}

fn paginate(items: Vec<Value>, pairs: &[(String, String)]) -> (Vec<Value>, Value) {
    let page = query_u32(pairs, "page", 1).max(1);
    let limit = query_u32(pairs, "limit", 10).max(1);
    let total = items.len();
    let pages = total.div_ceil(limit as usize);
    let slice = items
        .into_iter()
        .skip((page as usize - 1) * limit as usize)
        .take(limit as usize)
        .collect();
    let meta = json!({"page": page, "limit": limit, "total": total, "pages": pages});
    (slice, meta)
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"message": message}))).into_response()
}

fn session_user(state: &FakeState, headers: &HeaderMap) -> Result<Value, Response> {
    if state.expire_sessions.load(Ordering::SeqCst) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"code": "SESSION_EXPIRED", "message": "Sessão encerrada"})),
        )
            .into_response());
    }
    let token = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .find_map(|c| c.trim().strip_prefix(&format!("{COOKIE_NAME}=")).map(String::from))
        })
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Não autenticado"))?;
    let user_id = state
        .sessions
        .lock()
        .unwrap()
        .get(&token)
        .cloned()
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Sessão inválida"))?;
    state
        .accounts
        .lock()
        .unwrap()
        .iter()
        .find(|a| a.user["id"] == user_id.as_str())
        .map(|a| a.user.clone())
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Sessão inválida"))
}

fn list_failure(state: &FakeState) -> Option<Response> {
    state
        .fail_lists
        .load(Ordering::SeqCst)
        .then(|| error(StatusCode::INTERNAL_SERVER_ERROR, "Banco indisponível"))
}

async fn list_posts(State(state): State<Arc<FakeState>>, RawQuery(q): RawQuery) -> Response {
    if let Some(failure) = list_failure(&state) {
        return failure;
    }
    let pairs = query_pairs(q);
    let posts = state.posts.lock().unwrap().clone();
    let (data, pagination) = paginate(posts, &pairs);
    Json(json!({"success": true, "data": data, "pagination": pagination})).into_response()
}

async fn search_posts(State(state): State<Arc<FakeState>>, RawQuery(q): RawQuery) -> Response {
    if let Some(failure) = list_failure(&state) {
        return failure;
    }
    let pairs = query_pairs(q);
    let term = pairs
        .iter()
        .find(|(k, _)| k == "search")
        .map(|(_, v)| v.to_lowercase())
        .unwrap_or_default();
    let posts: Vec<Value> = state
        .posts
        .lock()
        .unwrap()
        .iter()
        .filter(|p| {
            p["titulo"].as_str().unwrap_or_default().to_lowercase().contains(&term)
                || p["conteudo"].as_str().unwrap_or_default().to_lowercase().contains(&term)
        })
        .cloned()
        .collect();
    let (data, pagination) = paginate(posts, &pairs);
    Json(json!({"success": true, "data": data, "pagination": pagination})).into_response()
}

async fn posts_by_author(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<String>,
    RawQuery(q): RawQuery,
) -> Response {
    if let Some(failure) = list_failure(&state) {
        return failure;
    }
    let pairs = query_pairs(q);
    let author: i64 = id.parse().unwrap_or(-1);
    let posts: Vec<Value> = state
        .posts
        .lock()
        .unwrap()
        .iter()
        .filter(|p| p["autorId"] == author)
        .cloned()
        .collect();
    let (data, pagination) = paginate(posts, &pairs);
    Json(json!({"success": true, "data": data, "pagination": pagination})).into_response()
}

async fn get_post(State(state): State<Arc<FakeState>>, Path(id): Path<i64>) -> Response {
    match state.posts.lock().unwrap().iter().find(|p| p["id"] == id) {
        Some(post) => Json(json!({"data": post})).into_response(),
        None => error(StatusCode::NOT_FOUND, "Post não encontrado"),
    }
}

async fn create_post(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let user = match session_user(&state, &headers) {
        Ok(user) => user,
        Err(response) => return response,
    };
    if body["titulo"].as_str().unwrap_or_default().is_empty() {
        return error(StatusCode::BAD_REQUEST, "Título é obrigatório");
    }
    let id = state.next_id.fetch_add(1, Ordering::SeqCst);
    let author_id: i64 = user["id"].as_str().and_then(|s| s.parse().ok()).unwrap_or(0);
    let post = json!({
        "id": id,
        "titulo": body["titulo"],
        "conteudo": body["conteudo"],
        "autorId": author_id,
        "createdAt": "2025-03-01T12:00:00Z",
        "atualizacao": "2025-03-01T12:00:00Z",
        "autor": {"id": author_id, "email": user["email"], "name": user["name"]},
    });
    state.posts.lock().unwrap().push(post.clone());
    (StatusCode::CREATED, Json(json!({"data": post}))).into_response()
}

async fn update_post(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = session_user(&state, &headers) {
        return response;
    }
    let mut posts = state.posts.lock().unwrap();
    let Some(post) = posts.iter_mut().find(|p| p["id"] == id) else {
        return error(StatusCode::NOT_FOUND, "Post não encontrado");
    };
    for field in ["titulo", "conteudo"] {
        if let Some(value) = body.get(field) {
            post[field] = value.clone();
        }
    }
    post["atualizacao"] = json!("2025-03-02T12:00:00Z");
    Json(json!({"data": post.clone()})).into_response()
}

async fn delete_post(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = session_user(&state, &headers) {
        return response;
    }
    let mut posts = state.posts.lock().unwrap();
    let before = posts.len();
    posts.retain(|p| p["id"] != id);
    if posts.len() == before {
        return error(StatusCode::NOT_FOUND, "Post não encontrado");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_users(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    RawQuery(q): RawQuery,
) -> Response {
    if let Err(response) = session_user(&state, &headers) {
        return response;
    }
    if let Some(failure) = list_failure(&state) {
        return failure;
    }
    let pairs = query_pairs(q);
    let roles: Vec<String> = pairs
        .iter()
        .filter(|(k, _)| k == "role")
        .map(|(_, v)| v.clone())
        .collect();
    let users: Vec<Value> = state
        .accounts
        .lock()
        .unwrap()
        .iter()
        .filter(|a| roles.is_empty() || roles.iter().any(|r| a.user["appRole"] == r.as_str()))
        .map(|a| a.user.clone())
        .collect();
    let (data, pagination) = paginate(users, &pairs);
    // No pagination block here: clients derive it from `total`.
    Json(json!({"data": data, "total": pagination["total"]})).into_response()
}

async fn get_user(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = session_user(&state, &headers) {
        return response;
    }
    let accounts = state.accounts.lock().unwrap();
    match accounts.iter().find(|a| a.user["id"] == id.as_str()) {
        Some(account) => Json(json!({"data": account.user})).into_response(),
        None => error(StatusCode::NOT_FOUND, "Usuário não encontrado"),
    }
}

async fn create_user(
    State(state): State<Arc<FakeState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = session_user(&state, &headers) {
        return response;
    }
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let mut accounts = state.accounts.lock().unwrap();
    if accounts.iter().any(|a| a.user["email"] == email.as_str()) {
        return error(StatusCode::CONFLICT, "E-mail já cadastrado");
    }
    let id = state.next_id.fetch_add(1, Ordering::SeqCst).to_string();
    let user = json!({
        "id": id,
        "name": body["name"],
        "email": email,
        "role": body.get("role").cloned().unwrap_or(json!("user")),
        "appRole": body["appRole"],
        "createdAt": "2025-03-01T12:00:00Z",
    });
    accounts.push(Account {
        user: user.clone(),
        password: body["password"].as_str().unwrap_or_default().to_string(),
    });
    (StatusCode::CREATED, Json(json!({"data": user}))).into_response()
}

async fn update_user(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = session_user(&state, &headers) {
        return response;
    }
    let mut accounts = state.accounts.lock().unwrap();
    let Some(account) = accounts.iter_mut().find(|a| a.user["id"] == id.as_str()) else {
        return error(StatusCode::NOT_FOUND, "Usuário não encontrado");
    };
    for field in ["name", "email", "role", "appRole"] {
        if let Some(value) = body.get(field) {
            account.user[field] = value.clone();
        }
    }
    if let Some(password) = body.get("password").and_then(Value::as_str) {
        account.password = password.to_string();
    }
    Json(json!({"data": account.user.clone()})).into_response()
}

async fn delete_user(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(response) = session_user(&state, &headers) {
        return response;
    }
    state.accounts.lock().unwrap().retain(|a| a.user["id"] != id.as_str());
    StatusCode::NO_CONTENT.into_response()
}

fn session_cookie_response(token: &str, user: &Value) -> Response {
    (
        [(
            header::SET_COOKIE,
            format!("{COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax"),
        )],
        Json(json!({"token": token, "user": user})),
    )
        .into_response()
}

async fn sign_in(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    let account = state
        .accounts
        .lock()
        .unwrap()
        .iter()
        .find(|a| a.user["email"] == email && a.password == password)
        .cloned();
    let Some(account) = account else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"code": "INVALID_EMAIL_OR_PASSWORD", "message": "Invalid email or password"})),
        )
            .into_response();
    };
    let token = format!("tok-{}", state.next_id.fetch_add(1, Ordering::SeqCst));
    let user_id = account.user["id"].as_str().unwrap_or_default().to_string();
    state.sessions.lock().unwrap().insert(token.clone(), user_id);
    session_cookie_response(&token, &account.user)
}

async fn sign_up(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if state.accounts.lock().unwrap().iter().any(|a| a.user["email"] == email.as_str()) {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"code": "USER_ALREADY_EXISTS", "message": "User already exists"})),
        )
            .into_response();
    }
    let id = state.next_id.fetch_add(1, Ordering::SeqCst).to_string();
    let user = json!({
        "id": id,
        "name": body["name"],
        "email": email,
        "role": "user",
        "appRole": "TEACHER",
        "createdAt": "2025-03-01T12:00:00Z",
    });
    state.accounts.lock().unwrap().push(Account {
        user: user.clone(),
        password: body["password"].as_str().unwrap_or_default().to_string(),
    });
    let token = format!("tok-{}", state.next_id.fetch_add(1, Ordering::SeqCst));
    state.sessions.lock().unwrap().insert(token.clone(), id);
    session_cookie_response(&token, &user)
}

async fn sign_out(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    if let Some(cookies) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
        for cookie in cookies.split(';') {
            if let Some(token) = cookie.trim().strip_prefix(&format!("{COOKIE_NAME}=")) {
                state.sessions.lock().unwrap().remove(token);
            }
        }
    }
    Json(json!({"success": true})).into_response()
}

async fn get_session(State(state): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    match session_user(&state, &headers) {
        Ok(user) => Json(json!({
            "session": {"id": "s", "expiresAt": "2030-01-01T00:00:00Z"},
            "user": user,
        }))
        .into_response(),
        Err(_) => Json(Value::Null).into_response(),
    }
}
