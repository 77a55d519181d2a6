//! In-memory stand-in for the gateway's admin API (consumers and ACLs).
//!
//! Responses mirror the gateway's shapes: pages are `{"data":[...],"total":n,
//! "next":null}` and missing resources answer 404 `{"message":"Not found"}`.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const ADMIN_TOKEN_HEADER: &str = "kong-admin-token";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Consumer {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
    pub created_at: i64,
}

#[derive(Deserialize)]
pub struct CreateConsumer {
    pub username: Option<String>,
    pub custom_id: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Acl {
    pub id: String,
    pub created_at: i64,
    pub group: String,
    pub consumer_id: String,
}

#[derive(Deserialize)]
pub struct CreateAcl {
    pub group: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AclQuery {
    pub id: Option<String>,
    pub consumer_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: usize,
    pub next: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

type Failure = (StatusCode, Json<Message>);

fn failure(status: StatusCode, message: impl Into<String>) -> Failure {
    (
        status,
        Json(Message {
            message: message.into(),
        }),
    )
}

fn not_found() -> Failure {
    failure(StatusCode::NOT_FOUND, "Not found")
}

#[derive(Default)]
pub struct Store {
    consumers: HashMap<String, Consumer>,
    // Insertion order doubles as listing order.
    acls: Vec<Acl>,
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
struct AppState {
    db: Db,
    admin_token: Option<Arc<str>>,
}

pub fn app() -> Router {
    app_with_token(None)
}

/// Router that rejects requests whose `Kong-Admin-Token` header does not
/// match `admin_token` (when set).
pub fn app_with_token(admin_token: Option<String>) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::default())),
        admin_token: admin_token.map(Arc::from),
    };
    Router::new()
        .route("/consumers", post(create_consumer))
        .route("/consumers/{id}", get(get_consumer))
        .route(
            "/consumers/{consumer_id}/acls/",
            get(list_consumer_acls).post(create_acl),
        )
        .route("/acls/", get(list_acls))
        .route("/acls/{id}", get(get_acl).delete(delete_acl))
        .route("/acls/{id}/consumer", get(get_acl_consumer))
        .layer(middleware::from_fn_with_state(state.clone(), require_admin_token))
        .with_state(state)
}

pub async fn run(listener: TcpListener, admin_token: Option<String>) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_token(admin_token)).await
}

async fn require_admin_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if let Some(expected) = &state.admin_token {
        let presented = request
            .headers()
            .get(ADMIN_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok());
        if presented != Some(expected.as_ref()) {
            tracing::warn!(path = %request.uri().path(), "rejected request without valid admin token");
            return failure(StatusCode::UNAUTHORIZED, "Invalid credentials").into_response();
        }
    }
    next.run(request).await
}

fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

fn page<T>(data: Vec<T>) -> Json<Page<T>> {
    Json(Page {
        total: data.len(),
        data,
        next: None,
    })
}

async fn create_consumer(
    State(state): State<AppState>,
    Json(input): Json<CreateConsumer>,
) -> Result<(StatusCode, Json<Consumer>), Failure> {
    if input.username.is_none() && input.custom_id.is_none() {
        return Err(failure(
            StatusCode::BAD_REQUEST,
            "At least one of these fields must be non-empty: 'custom_id', 'username'",
        ));
    }
    let consumer = Consumer {
        id: Uuid::new_v4().to_string(),
        username: input.username,
        custom_id: input.custom_id,
        created_at: now(),
    };
    state
        .db
        .write()
        .await
        .consumers
        .insert(consumer.id.clone(), consumer.clone());
    Ok((StatusCode::CREATED, Json(consumer)))
}

async fn get_consumer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Consumer>, Failure> {
    let store = state.db.read().await;
    store.consumers.get(&id).cloned().map(Json).ok_or_else(not_found)
}

async fn list_consumer_acls(
    State(state): State<AppState>,
    Path(consumer_id): Path<String>,
) -> Result<Json<Page<Acl>>, Failure> {
    let store = state.db.read().await;
    if !store.consumers.contains_key(&consumer_id) {
        return Err(not_found());
    }
    let acls = store
        .acls
        .iter()
        .filter(|acl| acl.consumer_id == consumer_id)
        .cloned()
        .collect();
    Ok(page(acls))
}

async fn create_acl(
    State(state): State<AppState>,
    Path(consumer_id): Path<String>,
    Json(input): Json<CreateAcl>,
) -> Result<(StatusCode, Json<Acl>), Failure> {
    let mut store = state.db.write().await;
    if !store.consumers.contains_key(&consumer_id) {
        return Err(not_found());
    }
    let duplicate = store
        .acls
        .iter()
        .any(|acl| acl.consumer_id == consumer_id && acl.group == input.group);
    if duplicate {
        return Err(failure(
            StatusCode::CONFLICT,
            format!(
                "UNIQUE violation detected on '{{consumer_id={consumer_id},group=\"{}\"}}'",
                input.group
            ),
        ));
    }
    let acl = Acl {
        id: Uuid::new_v4().to_string(),
        created_at: now(),
        group: input.group,
        consumer_id,
    };
    store.acls.push(acl.clone());
    Ok((StatusCode::CREATED, Json(acl)))
}

async fn list_acls(State(state): State<AppState>, Query(query): Query<AclQuery>) -> Json<Page<Acl>> {
    let store = state.db.read().await;
    let acls = store
        .acls
        .iter()
        .filter(|acl| query.id.as_ref().map_or(true, |id| &acl.id == id))
        .filter(|acl| {
            query
                .consumer_id
                .as_ref()
                .map_or(true, |consumer_id| &acl.consumer_id == consumer_id)
        })
        .cloned()
        .collect();
    page(acls)
}

async fn get_acl(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Acl>, Failure> {
    let store = state.db.read().await;
    store
        .acls
        .iter()
        .find(|acl| acl.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(not_found)
}

async fn get_acl_consumer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Consumer>, Failure> {
    let store = state.db.read().await;
    let acl = store.acls.iter().find(|acl| acl.id == id).ok_or_else(not_found)?;
    store
        .consumers
        .get(&acl.consumer_id)
        .cloned()
        .map(Json)
        .ok_or_else(not_found)
}

async fn delete_acl(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, Failure> {
    let mut store = state.db.write().await;
    let index = store.acls.iter().position(|acl| acl.id == id).ok_or_else(not_found)?;
    store.acls.remove(index);
    Ok(StatusCode::NO_CONTENT)
}
