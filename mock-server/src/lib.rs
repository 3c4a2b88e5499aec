//! In-memory stand-in for a small slice of the Twitter REST API.
//!
//! Endpoints carry a `.json` suffix, POST bodies are form-encoded, and
//! failures come back the way the real API reports them: either a bad status
//! code or a payload with an `error` field.

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Status {
    pub id: u64,
    pub text: String,
    pub screen_name: String,
}

#[derive(Default)]
pub struct Timeline {
    next_id: AtomicU64,
    statuses: RwLock<BTreeMap<u64, Status>>,
}

pub type Db = Arc<Timeline>;

pub const SCREEN_NAME: &str = "waiter";

#[derive(Deserialize)]
pub struct UpdateForm {
    pub status: String,
}

#[derive(Deserialize)]
pub struct IdParams {
    pub id: Option<u64>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

pub fn app() -> Router {
    let db: Db = Arc::new(Timeline::default());
    Router::new()
        .route("/statuses/update.json", post(update_status))
        .route("/statuses/destroy.json", post(destroy_status))
        .route("/statuses/show.json", get(show_status))
        .route("/statuses/user_timeline.json", get(user_timeline))
        .route("/search.json", get(search))
        .route("/account/verify_credentials.json", get(verify_credentials))
        .route("/trends.json", get(over_capacity))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error_body(message: &str) -> Json<Value> {
    Json(json!({ "error": message }))
}

async fn update_status(
    State(db): State<Db>,
    Form(input): Form<UpdateForm>,
) -> (StatusCode, Json<Value>) {
    if input.status.trim().is_empty() {
        return (StatusCode::FORBIDDEN, error_body("Status is empty."));
    }
    let status = Status {
        id: db.next_id.fetch_add(1, Ordering::SeqCst) + 1,
        text: input.status,
        screen_name: SCREEN_NAME.to_string(),
    };
    info!(id = status.id, "status created");
    db.statuses.write().await.insert(status.id, status.clone());
    (StatusCode::OK, Json(json!(status)))
}

async fn destroy_status(
    State(db): State<Db>,
    Form(input): Form<IdParams>,
) -> Result<Json<Status>, StatusCode> {
    let id = input.id.ok_or(StatusCode::NOT_FOUND)?;
    db.statuses
        .write()
        .await
        .remove(&id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn show_status(
    State(db): State<Db>,
    Query(params): Query<IdParams>,
) -> Result<Json<Status>, StatusCode> {
    let id = params.id.ok_or(StatusCode::NOT_FOUND)?;
    let statuses = db.statuses.read().await;
    statuses.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn user_timeline(State(db): State<Db>) -> Json<Vec<Status>> {
    let statuses = db.statuses.read().await;
    Json(statuses.values().rev().cloned().collect())
}

async fn search(State(db): State<Db>, Query(params): Query<SearchParams>) -> Json<Value> {
    let query = params.q.unwrap_or_default();
    let statuses = db.statuses.read().await;
    let results: Vec<&Status> = statuses
        .values()
        .filter(|s| !query.is_empty() && s.text.contains(&query))
        .collect();
    Json(json!({ "query": query, "results": results }))
}

async fn verify_credentials() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        error_body("Could not authenticate you."),
    )
}

async fn over_capacity() -> (StatusCode, &'static str) {
    (StatusCode::SERVICE_UNAVAILABLE, "<html>Twitter is over capacity.</html>")
}
