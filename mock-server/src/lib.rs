//! In-memory stand-in for the hosted backend.
//!
//! Serves the subset of the REST and auth surface the client uses:
//! `GET /rest/v1/{table}` with `column=eq.value` filters, `order` and
//! `limit`; `POST /rest/v1/{table}` to insert rows; `GET /auth/v1/user` for
//! the bearer token's user. `POST /auth/v1/sessions` registers a token so
//! tests can sign a user in.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Default)]
pub struct Store {
    tables: HashMap<String, Vec<Value>>,
    sessions: HashMap<String, SessionUser>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub email: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateSession {
    pub token: String,
    pub user: SessionUser,
}

pub type Db = Arc<RwLock<Store>>;

type ApiResult<T> = Result<T, (StatusCode, Json<Value>)>;

const RESERVED_PARAMS: [&str; 3] = ["select", "order", "limit"];

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/rest/v1/{table}", get(select_rows).post(insert_rows))
        .route("/auth/v1/user", get(session_user))
        .route("/auth/v1/sessions", post(create_session))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(serde_json::json!({ "message": message.into() })))
}

fn require_apikey(headers: &HeaderMap) -> ApiResult<()> {
    match headers.get("apikey") {
        Some(v) if !v.is_empty() => Ok(()),
        _ => Err(error(StatusCode::UNAUTHORIZED, "no apikey header")),
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Column value as compared against an `eq.` filter.
fn cell_text(row: &Value, column: &str) -> Option<String> {
    match row.get(column)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

async fn select_rows(
    State(db): State<Db>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Json<Vec<Value>>> {
    require_apikey(&headers)?;

    let mut filters = Vec::new();
    for (column, raw) in &params {
        if RESERVED_PARAMS.contains(&column.as_str()) {
            continue;
        }
        let value = raw.strip_prefix("eq.").ok_or_else(|| {
            error(StatusCode::BAD_REQUEST, format!("unsupported filter: {column}={raw}"))
        })?;
        filters.push((column.as_str(), value));
    }

    let store = db.read().await;
    let mut rows: Vec<Value> = store
        .tables
        .get(&table)
        .map(|rows| {
            rows.iter()
                .rev()
                .filter(|row| {
                    filters
                        .iter()
                        .all(|(c, v)| cell_text(row, c).as_deref() == Some(*v))
                })
                .cloned()
                .collect()
        })
        .unwrap_or_default();

    if let Some(order) = params.get("order") {
        let (column, direction) = order.split_once('.').unwrap_or((order.as_str(), "asc"));
        rows.sort_by(|a, b| cell_text(a, column).cmp(&cell_text(b, column)));
        if direction == "desc" {
            rows.reverse();
        }
    }

    if let Some(limit) = params.get("limit") {
        let limit: usize = limit
            .parse()
            .map_err(|_| error(StatusCode::BAD_REQUEST, format!("bad limit: {limit}")))?;
        rows.truncate(limit);
    }

    Ok(Json(rows))
}

async fn insert_rows(
    State(db): State<Db>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> ApiResult<(StatusCode, Json<Vec<Value>>)> {
    require_apikey(&headers)?;

    let rows = match input {
        Value::Array(rows) => rows,
        row @ Value::Object(_) => vec![row],
        _ => return Err(error(StatusCode::BAD_REQUEST, "expected an object or array")),
    };

    let mut inserted = Vec::with_capacity(rows.len());
    for mut row in rows {
        let Some(object) = row.as_object_mut() else {
            return Err(error(StatusCode::BAD_REQUEST, "rows must be objects"));
        };
        object
            .entry("id")
            .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        inserted.push(row);
    }

    db.write()
        .await
        .tables
        .entry(table)
        .or_default()
        .extend(inserted.iter().cloned());
    Ok((StatusCode::CREATED, Json(inserted)))
}

async fn session_user(State(db): State<Db>, headers: HeaderMap) -> ApiResult<Json<SessionUser>> {
    require_apikey(&headers)?;
    let token = bearer(&headers).ok_or_else(|| error(StatusCode::UNAUTHORIZED, "missing bearer"))?;
    db.read()
        .await
        .sessions
        .get(token)
        .cloned()
        .map(Json)
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "invalid JWT"))
}

async fn create_session(State(db): State<Db>, Json(input): Json<CreateSession>) -> StatusCode {
    db.write().await.sessions.insert(input.token, input.user);
    StatusCode::CREATED
}
