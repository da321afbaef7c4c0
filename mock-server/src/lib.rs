use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, warn};
use uuid::Uuid;

pub const INTEGRATION_CLIENT_ID: &str = "SWIAMOCKINTEGRATION";
pub const INTEGRATION_CLIENT_SECRET: &str = "mock-integration-secret";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "shopware";
pub const SHOP_VERSION: &str = "6.6.10.0";

const ENTITIES: [&str; 4] = ["delivery_time", "shipping_method", "rule", "rule_condition"];

type Rows = BTreeMap<String, Map<String, Value>>;

/// In-memory shop: issued bearer tokens plus entities keyed by entity name
/// and id. Entities are stored as raw JSON objects, the way the Admin API
/// hands them out.
#[derive(Debug, Default)]
pub struct Store {
    tokens: HashSet<String>,
    entities: HashMap<String, Rows>,
}

impl Store {
    /// Stored JSON for `entity`/`id`, if any.
    pub fn get(&self, entity: &str, id: &str) -> Option<&Map<String, Value>> {
        self.entities.get(entity).and_then(|rows| rows.get(id))
    }

    pub fn count(&self, entity: &str) -> usize {
        self.entities.get(entity).map_or(0, BTreeMap::len)
    }

    /// Drop every issued token, as if they had all expired.
    pub fn revoke_tokens(&mut self) {
        self.tokens.clear();
    }

    /// The `rule_condition` rows of `rule_id`, ordered by position.
    pub fn conditions_of(&self, rule_id: &str) -> Vec<Map<String, Value>> {
        let mut rows: Vec<Map<String, Value>> = self
            .entities
            .get("rule_condition")
            .into_iter()
            .flat_map(BTreeMap::values)
            .filter(|row| row.get("ruleId").and_then(Value::as_str) == Some(rule_id))
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.get("position").and_then(Value::as_i64).unwrap_or_default());
        rows
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Deserialize)]
pub struct TokenRequest {
    pub grant_type: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct SearchRequest {
    #[serde(default)]
    pub ids: Vec<String>,
    #[serde(default)]
    pub associations: Map<String, Value>,
}

#[derive(Deserialize)]
pub struct SyncOperation {
    pub entity: String,
    pub action: String,
    #[serde(default)]
    pub payload: Vec<Value>,
}

pub fn app() -> Router {
    app_with_db(Db::default())
}

/// Router over an existing store, so tests can inspect what was written.
pub fn app_with_db(db: Db) -> Router {
    Router::new()
        .route("/api/oauth/token", post(issue_token))
        .route("/api/_info/version", get(info_version))
        .route("/api/search/{entity}", post(search))
        .route("/api/_action/sync", post(sync))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_db(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_db(db)).await
}

type ApiResult = Result<Json<Value>, (StatusCode, Json<Value>)>;

fn error(status: StatusCode, code: &str, detail: impl Into<String>) -> (StatusCode, Json<Value>) {
    let detail = detail.into();
    warn!(%status, code, %detail, "rejecting request");
    (
        status,
        Json(json!({ "errors": [{ "status": status.as_u16().to_string(), "code": code, "detail": detail }] })),
    )
}

async fn authorize(db: &Db, headers: &HeaderMap) -> Result<(), (StatusCode, Json<Value>)> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match token {
        Some(token) if db.read().await.tokens.contains(token) => Ok(()),
        _ => Err(error(
            StatusCode::UNAUTHORIZED,
            "FRAMEWORK__UNAUTHORIZED",
            "missing or unknown bearer token",
        )),
    }
}

fn known_entity(entity: &str) -> Result<(), (StatusCode, Json<Value>)> {
    if ENTITIES.contains(&entity) {
        Ok(())
    } else {
        Err(error(
            StatusCode::BAD_REQUEST,
            "FRAMEWORK__DEFINITION_NOT_FOUND",
            format!("definition for entity `{entity}` not found"),
        ))
    }
}

async fn issue_token(State(db): State<Db>, Json(input): Json<TokenRequest>) -> ApiResult {
    let accepted = match input.grant_type.as_str() {
        "client_credentials" => {
            input.client_id == INTEGRATION_CLIENT_ID
                && input.client_secret.as_deref() == Some(INTEGRATION_CLIENT_SECRET)
        }
        "password" => {
            input.client_id == "administration"
                && input.username.as_deref() == Some(ADMIN_USERNAME)
                && input.password.as_deref() == Some(ADMIN_PASSWORD)
        }
        _ => false,
    };
    if !accepted {
        return Err(error(
            StatusCode::UNAUTHORIZED,
            "invalid_client",
            "client authentication failed",
        ));
    }

    let token = Uuid::new_v4().simple().to_string();
    db.write().await.tokens.insert(token.clone());
    debug!(grant_type = %input.grant_type, "issued token");
    Ok(Json(json!({
        "token_type": "Bearer",
        "expires_in": 600,
        "access_token": token,
    })))
}

async fn info_version(State(db): State<Db>, headers: HeaderMap) -> ApiResult {
    authorize(&db, &headers).await?;
    Ok(Json(json!({ "version": SHOP_VERSION })))
}

async fn search(
    State(db): State<Db>,
    Path(path): Path<String>,
    headers: HeaderMap,
    Json(criteria): Json<SearchRequest>,
) -> ApiResult {
    authorize(&db, &headers).await?;
    let entity = path.replace('-', "_");
    known_entity(&entity)?;

    let store = db.read().await;
    let rows = store.entities.get(&entity);
    let mut data: Vec<Value> = match rows {
        None => Vec::new(),
        Some(rows) if criteria.ids.is_empty() => rows.values().cloned().map(Value::Object).collect(),
        Some(rows) => criteria
            .ids
            .iter()
            .filter_map(|id| rows.get(id))
            .cloned()
            .map(Value::Object)
            .collect(),
    };

    // Conditions live in their own table and are only hydrated on request,
    // like the real API.
    if entity == "rule" {
        let hydrate = criteria.associations.contains_key("conditions");
        for row in &mut data {
            let Some(row) = row.as_object_mut() else { continue };
            let conditions = match row.get("id").and_then(Value::as_str) {
                Some(id) if hydrate => {
                    Value::Array(store.conditions_of(id).into_iter().map(Value::Object).collect())
                }
                _ => Value::Null,
            };
            row.insert("conditions".to_string(), conditions);
        }
    }

    Ok(Json(json!({ "total": data.len(), "data": data })))
}

async fn sync(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(operations): Json<BTreeMap<String, SyncOperation>>,
) -> ApiResult {
    authorize(&db, &headers).await?;

    let mut store = db.write().await;
    // Apply against a copy so a failing operation leaves the store untouched.
    let mut entities = store.entities.clone();
    for (key, op) in operations {
        known_entity(&op.entity)?;
        for item in op.payload {
            let Value::Object(mut item) = item else {
                return Err(invalid_sync(format!("{key}: payload item is not an object")));
            };
            let Some(id) = item.get("id").and_then(Value::as_str).map(str::to_string) else {
                return Err(invalid_sync(format!("{key}: payload item has no id")));
            };
            match op.action.as_str() {
                "upsert" => {
                    let nested = match op.entity.as_str() {
                        "rule" => item.remove("conditions"),
                        _ => None,
                    };
                    merge(entities.entry(op.entity.clone()).or_default(), id.clone(), item);
                    if let Some(nested) = nested {
                        upsert_conditions(&mut entities, &id, nested, &key)?;
                    }
                }
                "delete" => {
                    if let Some(rows) = entities.get_mut(&op.entity) {
                        rows.remove(&id);
                    }
                    if op.entity == "rule" {
                        if let Some(conditions) = entities.get_mut("rule_condition") {
                            conditions
                                .retain(|_, row| row.get("ruleId").and_then(Value::as_str) != Some(id.as_str()));
                        }
                    }
                }
                other => return Err(invalid_sync(format!("{key}: unknown action `{other}`"))),
            }
        }
    }
    store.entities = entities;

    Ok(Json(json!({ "success": true })))
}

fn invalid_sync(detail: String) -> (StatusCode, Json<Value>) {
    error(StatusCode::BAD_REQUEST, "FRAMEWORK__INVALID_SYNC", detail)
}

/// Upsert is a shallow merge into the stored row.
fn merge(rows: &mut Rows, id: String, item: Map<String, Value>) {
    let row = rows.entry(id).or_default();
    for (field, value) in item {
        row.insert(field, value);
    }
}

/// Nested conditions of a rule upsert. Items carrying an id update that
/// row; items without one always become a new row, and rows not mentioned
/// are kept.
fn upsert_conditions(
    entities: &mut HashMap<String, Rows>,
    rule_id: &str,
    nested: Value,
    key: &str,
) -> Result<(), (StatusCode, Json<Value>)> {
    let conditions = match nested {
        Value::Null => return Ok(()),
        Value::Array(conditions) => conditions,
        _ => return Err(invalid_sync(format!("{key}: conditions must be a list"))),
    };
    let rows = entities.entry("rule_condition".to_string()).or_default();
    for condition in conditions {
        let Value::Object(mut condition) = condition else {
            return Err(invalid_sync(format!("{key}: condition is not an object")));
        };
        let id = match condition.get("id").and_then(Value::as_str) {
            Some(id) => id.to_string(),
            None => Uuid::new_v4().simple().to_string(),
        };
        condition.insert("id".to_string(), Value::String(id.clone()));
        condition.insert("ruleId".to_string(), Value::String(rule_id.to_string()));
        merge(rows, id, condition);
    }
    Ok(())
}
