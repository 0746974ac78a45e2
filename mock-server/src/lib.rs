//! In-memory stand-in for the mailer admin API.
//!
//! Speaks the same envelope contract as the real service: success bodies are
//! `{"data": …}` with snake_case keys, failures are non-2xx with
//! `{"message": …}`. Only the endpoints the gateway tests touch are served;
//! anything else falls through to axum's empty 404.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

const CREATED_AT: &str = "2024-01-01T00:00:00Z";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct List {
    pub id: u64,
    pub uuid: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub list_type: String,
    pub subscriber_count: u64,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Subscriber {
    pub id: u64,
    pub uuid: Uuid,
    pub email: String,
    pub name: String,
    pub status: String,
    pub list_ids: Vec<u64>,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Campaign {
    pub id: u64,
    pub uuid: Uuid,
    pub name: String,
    pub subject: String,
    pub status: String,
    pub list_ids: Vec<u64>,
    pub to_send: u64,
    pub sent: u64,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Template {
    pub id: u64,
    pub name: String,
    pub body: String,
    pub is_default: bool,
}

/// Success envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Failure envelope, rendered with its status code.
#[derive(Debug)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub message: String,
}

impl ApiFailure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{what} not found"))
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

type ApiResult<T> = Result<Json<Envelope<T>>, ApiFailure>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(Envelope { data }))
}

#[derive(Debug)]
pub struct Db {
    next_id: u64,
    lists: BTreeMap<u64, List>,
    subscribers: BTreeMap<u64, Subscriber>,
    campaigns: BTreeMap<u64, Campaign>,
    templates: BTreeMap<u64, Template>,
    settings: Map<String, Value>,
}

impl Db {
    /// Empty lists, subscribers and campaigns; one default template and
    /// stock settings.
    pub fn seeded() -> Self {
        let mut templates = BTreeMap::new();
        templates.insert(
            1,
            Template {
                id: 1,
                name: "Default template".to_string(),
                body: "{{ template \"content\" . }}".to_string(),
                is_default: true,
            },
        );
        let settings = json!({
            "app.root_url": "http://localhost:9000",
            "app.from_email": "mailer <noreply@localhost>",
            "app.concurrency": 10,
            "privacy.individual_tracking": false
        });
        Self {
            next_id: 2,
            lists: BTreeMap::new(),
            subscribers: BTreeMap::new(),
            campaigns: BTreeMap::new(),
            templates,
            settings: settings.as_object().cloned().unwrap_or_default(),
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn refresh_counts(&mut self) {
        for list in self.lists.values_mut() {
            list.subscriber_count = self
                .subscribers
                .values()
                .filter(|s| s.list_ids.contains(&list.id))
                .count() as u64;
        }
    }
}

pub type SharedDb = Arc<RwLock<Db>>;

/// Raw query pairs, keeping repeated keys.
type Pairs = Query<Vec<(String, String)>>;

fn values<'a>(pairs: &'a [(String, String)], key: &str) -> Vec<&'a str> {
    pairs
        .iter()
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
        .collect()
}

fn ids(pairs: &[(String, String)], key: &str) -> Result<Vec<u64>, ApiFailure> {
    values(pairs, key)
        .into_iter()
        .map(|v| {
            v.parse()
                .map_err(|_| ApiFailure::bad_request(format!("invalid {key}: {v}")))
        })
        .collect()
}

pub fn app() -> Router {
    let db: SharedDb = Arc::new(RwLock::new(Db::seeded()));
    Router::new()
        .route("/api/health", get(health))
        .route("/api/config", get(server_config))
        .route("/api/lang/{lang}", get(lang))
        .route("/v1/api/admin/reload", post(reload))
        .route("/v1/api/dashboard/counts", get(dashboard_counts))
        .route("/v1/api/lists", get(list_lists).post(create_list))
        .route("/v1/api/initlists", get(list_lists))
        .route("/v1/api/lists/{id}", put(update_list).delete(delete_list))
        .route(
            "/v1/api/subscribers",
            get(query_subscribers)
                .post(create_subscriber)
                .delete(delete_subscribers),
        )
        .route("/v1/api/subscribers/{id}", delete(delete_subscriber))
        .route("/v1/api/campaigns", get(list_campaigns).post(create_campaign))
        .route("/v1/api/campaigns/running/stats", get(running_stats))
        .route("/v1/api/campaigns/{id}", get(get_campaign).delete(delete_campaign))
        .route("/v1/api/campaigns/{id}/status", put(update_campaign_status))
        .route("/v1/api/templates", get(list_templates).post(create_template))
        .route("/v1/api/templates/{id}", delete(delete_template))
        .route("/v1/api/templates/{id}/default", put(default_template))
        .route("/v1/api/settings", get(get_settings).put(update_settings))
        .route("/v1/api/initsettings", get(get_settings))
        .route("/v1/api/logs", get(logs))
        .route("/v1/api/import/subscribers", get(import_status))
        .route("/v1/api/import/subscribers/logs", get(import_logs))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app().layer(TraceLayer::new_for_http())).await
}

// --- app ---

async fn health() -> ApiResult<bool> {
    ok(true)
}

async fn server_config() -> ApiResult<Value> {
    ok(json!({
        "root_url": "http://localhost:9000",
        "lang": "en",
        "needs_restart": false,
        "messengers": ["email"]
    }))
}

async fn lang(Path(lang): Path<String>) -> ApiResult<Value> {
    match lang.as_str() {
        "en" => ok(json!({
            "_.code": "en",
            "globals.buttons.ok": "OK",
            "globals.messages.confirm": "Are you sure?"
        })),
        other => Err(ApiFailure::bad_request(format!("unknown language: {other}"))),
    }
}

async fn reload() -> ApiResult<bool> {
    ok(true)
}

async fn dashboard_counts(State(db): State<SharedDb>) -> ApiResult<Value> {
    let db = db.read().await;
    ok(json!({
        "lists": { "total": db.lists.len() },
        "subscribers": { "total": db.subscribers.len() },
        "campaigns": { "total": db.campaigns.len() }
    }))
}

// --- lists ---

#[derive(Deserialize)]
pub struct ListInput {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub list_type: Option<String>,
}

async fn list_lists(State(db): State<SharedDb>, Query(pairs): Pairs) -> ApiResult<Value> {
    let db = db.read().await;
    let results: Vec<&List> = db.lists.values().collect();
    let per_page = values(&pairs, "per_page").first().copied().unwrap_or("20").to_string();
    ok(json!({
        "results": results,
        "total": results.len(),
        "per_page": per_page,
        "page": 1
    }))
}

async fn create_list(State(db): State<SharedDb>, Json(input): Json<ListInput>) -> ApiResult<List> {
    let name = input.name.unwrap_or_default();
    if name.trim().is_empty() {
        return Err(ApiFailure::bad_request("invalid list name"));
    }
    let mut db = db.write().await;
    let list = List {
        id: db.next_id(),
        uuid: Uuid::new_v4(),
        name,
        list_type: input.list_type.unwrap_or_else(|| "private".to_string()),
        subscriber_count: 0,
        created_at: CREATED_AT.to_string(),
    };
    db.lists.insert(list.id, list.clone());
    ok(list)
}

async fn update_list(
    State(db): State<SharedDb>,
    Path(id): Path<u64>,
    Json(input): Json<ListInput>,
) -> ApiResult<List> {
    let mut db = db.write().await;
    let list = db.lists.get_mut(&id).ok_or_else(|| ApiFailure::not_found("list"))?;
    if let Some(name) = input.name {
        list.name = name;
    }
    if let Some(list_type) = input.list_type {
        list.list_type = list_type;
    }
    ok(list.clone())
}

async fn delete_list(State(db): State<SharedDb>, Path(id): Path<u64>) -> ApiResult<bool> {
    let mut db = db.write().await;
    db.lists.remove(&id).ok_or_else(|| ApiFailure::not_found("list"))?;
    for subscriber in db.subscribers.values_mut() {
        subscriber.list_ids.retain(|l| *l != id);
    }
    ok(true)
}

// --- subscribers ---

#[derive(Deserialize)]
pub struct SubscriberInput {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub lists: Vec<u64>,
}

/// `list_id` may repeat; a subscriber matches when it belongs to any of them.
async fn query_subscribers(State(db): State<SharedDb>, Query(pairs): Pairs) -> ApiResult<Value> {
    let list_ids = ids(&pairs, "list_id")?;
    let db = db.read().await;
    let results: Vec<&Subscriber> = db
        .subscribers
        .values()
        .filter(|s| list_ids.is_empty() || s.list_ids.iter().any(|l| list_ids.contains(l)))
        .collect();
    ok(json!({ "results": results, "total": results.len() }))
}

async fn create_subscriber(
    State(db): State<SharedDb>,
    Json(input): Json<SubscriberInput>,
) -> ApiResult<Subscriber> {
    if !input.email.contains('@') {
        return Err(ApiFailure::bad_request("invalid email"));
    }
    let mut db = db.write().await;
    if db.subscribers.values().any(|s| s.email == input.email) {
        return Err(ApiFailure::new(StatusCode::CONFLICT, "E-mail already exists."));
    }
    let subscriber = Subscriber {
        id: db.next_id(),
        uuid: Uuid::new_v4(),
        email: input.email,
        name: input.name,
        status: "enabled".to_string(),
        list_ids: input.lists,
        created_at: CREATED_AT.to_string(),
    };
    db.subscribers.insert(subscriber.id, subscriber.clone());
    db.refresh_counts();
    ok(subscriber)
}

async fn delete_subscriber(State(db): State<SharedDb>, Path(id): Path<u64>) -> ApiResult<bool> {
    let mut db = db.write().await;
    db.subscribers
        .remove(&id)
        .ok_or_else(|| ApiFailure::not_found("subscriber"))?;
    db.refresh_counts();
    ok(true)
}

/// Bulk delete by repeated `id` parameters.
async fn delete_subscribers(State(db): State<SharedDb>, Query(pairs): Pairs) -> ApiResult<Value> {
    let ids = ids(&pairs, "id")?;
    if ids.is_empty() {
        return Err(ApiFailure::bad_request("no IDs given"));
    }
    let mut db = db.write().await;
    let deleted: Vec<u64> = ids
        .into_iter()
        .filter(|id| db.subscribers.remove(id).is_some())
        .collect();
    db.refresh_counts();
    ok(json!({ "deleted_ids": deleted }))
}

// --- campaigns ---

#[derive(Deserialize)]
pub struct CampaignInput {
    pub name: String,
    pub subject: String,
    #[serde(default)]
    pub lists: Vec<u64>,
}

#[derive(Deserialize)]
pub struct StatusInput {
    pub status: String,
}

async fn list_campaigns(State(db): State<SharedDb>) -> ApiResult<Value> {
    let db = db.read().await;
    let results: Vec<&Campaign> = db.campaigns.values().collect();
    ok(json!({ "results": results, "total": results.len() }))
}

async fn get_campaign(State(db): State<SharedDb>, Path(id): Path<u64>) -> ApiResult<Campaign> {
    let db = db.read().await;
    let campaign = db.campaigns.get(&id).ok_or_else(|| ApiFailure::not_found("campaign"))?;
    ok(campaign.clone())
}

async fn running_stats(State(db): State<SharedDb>) -> ApiResult<Vec<Value>> {
    let db = db.read().await;
    let stats = db
        .campaigns
        .values()
        .filter(|c| c.status == "running")
        .map(|c| json!({ "id": c.id, "status": c.status, "to_send": c.to_send, "sent": c.sent }))
        .collect();
    ok(stats)
}

async fn create_campaign(
    State(db): State<SharedDb>,
    Json(input): Json<CampaignInput>,
) -> ApiResult<Campaign> {
    let mut db = db.write().await;
    if let Some(missing) = input.lists.iter().find(|l| !db.lists.contains_key(*l)) {
        return Err(ApiFailure::bad_request(format!("list {missing} not found")));
    }
    let to_send = db
        .subscribers
        .values()
        .filter(|s| s.list_ids.iter().any(|l| input.lists.contains(l)))
        .count() as u64;
    let campaign = Campaign {
        id: db.next_id(),
        uuid: Uuid::new_v4(),
        name: input.name,
        subject: input.subject,
        status: "draft".to_string(),
        list_ids: input.lists,
        to_send,
        sent: 0,
        created_at: CREATED_AT.to_string(),
    };
    db.campaigns.insert(campaign.id, campaign.clone());
    ok(campaign)
}

async fn update_campaign_status(
    State(db): State<SharedDb>,
    Path(id): Path<u64>,
    Json(input): Json<StatusInput>,
) -> ApiResult<Campaign> {
    let mut db = db.write().await;
    let campaign = db
        .campaigns
        .get_mut(&id)
        .ok_or_else(|| ApiFailure::not_found("campaign"))?;
    if matches!(campaign.status.as_str(), "finished" | "cancelled") {
        return Err(ApiFailure::bad_request("campaign is no longer active"));
    }
    let valid = matches!(
        input.status.as_str(),
        "scheduled" | "running" | "paused" | "cancelled" | "finished"
    );
    if !valid {
        return Err(ApiFailure::bad_request(format!(
            "invalid status: {}",
            input.status
        )));
    }
    campaign.status = input.status;
    ok(campaign.clone())
}

async fn delete_campaign(State(db): State<SharedDb>, Path(id): Path<u64>) -> ApiResult<bool> {
    let mut db = db.write().await;
    let campaign = db.campaigns.get(&id).ok_or_else(|| ApiFailure::not_found("campaign"))?;
    if campaign.status == "running" {
        return Err(ApiFailure::bad_request("cannot delete a running campaign"));
    }
    db.campaigns.remove(&id);
    ok(true)
}

// --- templates ---

#[derive(Deserialize)]
pub struct TemplateInput {
    pub name: String,
    #[serde(default)]
    pub body: String,
}

async fn list_templates(State(db): State<SharedDb>) -> ApiResult<Vec<Template>> {
    let db = db.read().await;
    ok(db.templates.values().cloned().collect())
}

async fn create_template(
    State(db): State<SharedDb>,
    Json(input): Json<TemplateInput>,
) -> ApiResult<Template> {
    let mut db = db.write().await;
    let template = Template {
        id: db.next_id(),
        name: input.name,
        body: input.body,
        is_default: false,
    };
    db.templates.insert(template.id, template.clone());
    ok(template)
}

async fn default_template(State(db): State<SharedDb>, Path(id): Path<u64>) -> ApiResult<Template> {
    let mut db = db.write().await;
    if !db.templates.contains_key(&id) {
        return Err(ApiFailure::not_found("template"));
    }
    for template in db.templates.values_mut() {
        template.is_default = template.id == id;
    }
    let template = db.templates.get(&id).ok_or_else(|| ApiFailure::not_found("template"))?;
    ok(template.clone())
}

async fn delete_template(State(db): State<SharedDb>, Path(id): Path<u64>) -> ApiResult<bool> {
    let mut db = db.write().await;
    let template = db.templates.get(&id).ok_or_else(|| ApiFailure::not_found("template"))?;
    if template.is_default {
        return Err(ApiFailure::bad_request("cannot delete the default template"));
    }
    db.templates.remove(&id);
    ok(true)
}

// --- settings, logs, import ---

async fn get_settings(State(db): State<SharedDb>) -> ApiResult<Map<String, Value>> {
    ok(db.read().await.settings.clone())
}

async fn update_settings(
    State(db): State<SharedDb>,
    Json(input): Json<Map<String, Value>>,
) -> ApiResult<Value> {
    let mut db = db.write().await;
    db.settings.extend(input);
    ok(json!({ "needs_restart": true }))
}

async fn logs() -> ApiResult<Vec<&'static str>> {
    ok(vec![
        "2024/01/01 00:00:00 main.go:1: loaded config",
        "2024/01/01 00:00:01 main.go:2: http server started",
    ])
}

async fn import_status() -> ApiResult<Value> {
    ok(json!({ "name": "", "status": "none", "imported": 0, "total": 0 }))
}

async fn import_logs() -> ApiResult<&'static str> {
    ok("import_started: subscribers.csv\nimport_finished: 0 records")
}
