#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};

use budget_tracker::config::ClientConfig;
use budget_tracker::session::{MemoryStorage, SessionStore};
use budget_tracker::ApiClient;

/// In-process stand-in for the budget API, following its HTTP contract
pub struct FakeApi {
    pub port: u16,
    pub base_url: String,
    state: FakeState,
    task: tokio::task::JoinHandle<()>,
}

impl Drop for FakeApi {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Default)]
pub struct ApiState {
    users: HashMap<String, (i64, String)>,
    tokens: HashMap<String, String>,
    categories: Vec<Value>,
    items: Vec<Value>,
    shared: Vec<Value>,
    next_id: i64,
    /// "METHOD /path" for every authenticated request received
    pub hits: Vec<String>,
    /// Served once, in place of the next authenticated response
    pub fail_next: Option<(u16, Value)>,
    pub list_delay: Option<Duration>,
    /// List items the way the deployed API does, with the category name only
    pub omit_item_category_ids: bool,
}

#[derive(Clone, Default)]
pub struct FakeState(Arc<Mutex<ApiState>>);

impl FakeState {
    pub fn lock(&self) -> MutexGuard<'_, ApiState> {
        self.0.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn authorize(&self, headers: &HeaderMap, hit: &str) -> Result<(), Response> {
        let mut db = self.lock();
        db.hits.push(hit.to_string());

        let token = headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::to_string);

        match token {
            Some(token) if db.tokens.contains_key(&token) => {}
            Some(_) => return Err(reply(401, json!({ "msg": "Token has expired" }))),
            None => return Err(reply(401, json!({ "msg": "Missing Authorization Header" }))),
        }

        if let Some((status, body)) = db.fail_next.take() {
            return Err(reply(status, body));
        }
        Ok(())
    }
}

fn reply(status: u16, body: Value) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

impl ApiState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn category_name(&self, id: i64) -> Option<String> {
        self.categories
            .iter()
            .find(|c| c["id"] == id)
            .and_then(|c| c["name"].as_str())
            .map(str::to_string)
    }
}

impl FakeApi {
    pub async fn start() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);
        let state = FakeState::default();

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind fake API")?;
        let app = router(state.clone());
        let task = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self { port, base_url, state, task })
    }

    pub fn state(&self) -> MutexGuard<'_, ApiState> {
        self.state.lock()
    }

    pub fn add_user(&self, username: &str, password: &str) {
        let mut db = self.state.lock();
        let id = db.next_id();
        db.users.insert(username.to_string(), (id, password.to_string()));
    }

    /// Authenticated requests received so far
    pub fn hit_count(&self) -> usize {
        self.state.lock().hits.len()
    }

    pub fn fail_next(&self, status: u16, body: Value) {
        self.state.lock().fail_next = Some((status, body));
    }

    pub fn omit_item_category_ids(&self) {
        self.state.lock().omit_item_category_ids = true;
    }

    pub fn delay_lists(&self, delay: Duration) {
        self.state.lock().list_delay = Some(delay);
    }

    /// Invalidate every issued token, as a server-side expiry would
    pub fn expire_tokens(&self) {
        self.state.lock().tokens.clear();
    }

    /// A client with its own in-memory session, pointed at this server
    pub fn client(&self) -> Result<ApiClient> {
        let session = SessionStore::shared(Box::new(MemoryStorage::default()))?;
        Ok(ApiClient::new(&ClientConfig::from_env().api, session)?.with_base_url(&self.base_url)?)
    }

    /// A logged-in client for alice/secret
    pub async fn alice(&self) -> Result<ApiClient> {
        self.add_user("alice", "secret");
        let client = self.client()?;
        client
            .login(&budget_tracker::models::Credentials::new("alice", "secret"))
            .await?;
        Ok(client)
    }
}

fn router(state: FakeState) -> Router {
    Router::new()
        .route("/", get(|| async { Json(json!({ "message": "Budget Tracker API" })) }))
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/:id", put(update_category).delete(delete_category))
        .route("/items", get(list_items).post(create_item))
        .route("/items/:id", put(update_item).delete(delete_item))
        .route("/shared", get(list_shared).post(create_shared))
        .route("/shared/:id", delete(delete_shared))
        .with_state(state)
}

fn mint_token(user_id: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &json!({ "sub": user_id, "exp": exp, "iat": exp - 3600, "jti": uuid::Uuid::new_v4().to_string() }),
        &jsonwebtoken::EncodingKey::from_secret(b"supersecret"),
    )
    .unwrap_or_default()
}

async fn login(State(state): State<FakeState>, Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let mut db = state.lock();
    match db.users.get(username).cloned() {
        Some((id, stored)) if stored == password => {
            let token = mint_token(id);
            db.tokens.insert(token.clone(), username.to_string());
            reply(200, json!({ "access_token": token }))
        }
        _ => reply(401, json!({ "error": "Invalid credentials" })),
    }
}

async fn register(State(state): State<FakeState>, Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();

    let mut db = state.lock();
    if db.users.contains_key(&username) {
        return reply(409, json!({ "error": "Username already taken" }));
    }
    let id = db.next_id();
    db.users.insert(username, (id, password));
    reply(201, json!({ "message": "User registered" }))
}

async fn delayed_list(state: &FakeState) {
    let delay = state.lock().list_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

async fn list_categories(State(state): State<FakeState>, headers: HeaderMap) -> Response {
    if let Err(r) = state.authorize(&headers, "GET /categories") {
        return r;
    }
    delayed_list(&state).await;
    let categories = state.lock().categories.clone();
    reply(200, Value::Array(categories))
}

async fn create_category(State(state): State<FakeState>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = state.authorize(&headers, "POST /categories") {
        return r;
    }
    let mut db = state.lock();
    let id = db.next_id();
    let category = json!({ "id": id, "name": body["name"] });
    db.categories.push(category.clone());
    reply(201, category)
}

async fn update_category(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = state.authorize(&headers, &format!("PUT /categories/{}", id)) {
        return r;
    }
    let mut db = state.lock();
    match db.categories.iter_mut().find(|c| c["id"] == id) {
        Some(category) => {
            category["name"] = body["name"].clone();
            reply(200, category.clone())
        }
        None => reply(404, json!({ "error": "Category not found" })),
    }
}

async fn delete_category(State(state): State<FakeState>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(r) = state.authorize(&headers, &format!("DELETE /categories/{}", id)) {
        return r;
    }
    let mut db = state.lock();
    let before = db.categories.len();
    db.categories.retain(|c| c["id"] != id);
    if db.categories.len() == before {
        return reply(404, json!({ "error": "Category not found" }));
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_items(State(state): State<FakeState>, headers: HeaderMap) -> Response {
    if let Err(r) = state.authorize(&headers, "GET /items") {
        return r;
    }
    delayed_list(&state).await;
    let db = state.lock();
    let mut items = db.items.clone();
    if db.omit_item_category_ids {
        for item in items.iter_mut().filter_map(Value::as_object_mut) {
            item.remove("category_id");
        }
    }
    reply(200, Value::Array(items))
}

fn item_from(db: &ApiState, id: i64, body: &Value) -> Result<Value, Response> {
    let category_id = body["category_id"].as_i64().unwrap_or_default();
    let category = db
        .category_name(category_id)
        .ok_or_else(|| reply(404, json!({ "error": "Invalid category" })))?;
    Ok(json!({
        "id": id,
        "title": body["title"],
        "amount": body["amount"].as_f64().unwrap_or_default(),
        "type": body["type"],
        "category_id": category_id,
        "category": category,
        "created_at": "Mon, 01 Jan 2024 00:00:00 GMT",
    }))
}

async fn create_item(State(state): State<FakeState>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = state.authorize(&headers, "POST /items") {
        return r;
    }
    let mut db = state.lock();
    let id = db.next_id;
    match item_from(&db, id + 1, &body) {
        Ok(item) => {
            db.next_id();
            db.items.push(item.clone());
            reply(201, item)
        }
        Err(r) => r,
    }
}

async fn update_item(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = state.authorize(&headers, &format!("PUT /items/{}", id)) {
        return r;
    }
    let mut db = state.lock();
    let updated = match item_from(&db, id, &body) {
        Ok(item) => item,
        Err(r) => return r,
    };
    match db.items.iter_mut().find(|i| i["id"] == id) {
        Some(item) => {
            *item = updated.clone();
            reply(200, updated)
        }
        None => reply(404, json!({ "error": "Item not found" })),
    }
}

async fn delete_item(State(state): State<FakeState>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(r) = state.authorize(&headers, &format!("DELETE /items/{}", id)) {
        return r;
    }
    let mut db = state.lock();
    db.items.retain(|i| i["id"] != id);
    db.shared.retain(|s| s["budget_item_id"] != id);
    reply(200, json!({ "message": "Item deleted" }))
}

async fn list_shared(State(state): State<FakeState>, headers: HeaderMap) -> Response {
    if let Err(r) = state.authorize(&headers, "GET /shared") {
        return r;
    }
    delayed_list(&state).await;
    let shared = state.lock().shared.clone();
    reply(200, Value::Array(shared))
}

async fn create_shared(State(state): State<FakeState>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = state.authorize(&headers, "POST /shared") {
        return r;
    }
    let mut db = state.lock();
    let item_id = body["budget_item_id"].as_i64().unwrap_or_default();
    let Some(item) = db.items.iter().find(|i| i["id"] == item_id).cloned() else {
        return reply(404, json!({ "error": "Item not found" }));
    };

    let percent = body["contribution_percent"].as_f64().unwrap_or(-1.0);
    if !(0.0..=100.0).contains(&percent) {
        return reply(400, json!({ "error": "Contribution must be 0-100" }));
    }

    let id = db.next_id();
    let amount = item["amount"].as_f64().unwrap_or_default() * percent / 100.0;
    db.shared.push(json!({
        "id": id,
        "budget_item_id": item_id,
        "item": item["title"],
        "type": item["type"],
        "contribution_percent": percent,
        "amount": amount,
    }));
    // The real API acknowledges without echoing the record
    reply(201, json!({ "message": "Shared budget added" }))
}

async fn delete_shared(State(state): State<FakeState>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if let Err(r) = state.authorize(&headers, &format!("DELETE /shared/{}", id)) {
        return r;
    }
    state.lock().shared.retain(|s| s["id"] != id);
    reply(200, json!({ "message": "Shared budget removed" }))
}
