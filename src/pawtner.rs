use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{Body, Bytes},
    extract::{FromRequest, Path, Query, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Form, Json, Router,
};
use futures::FutureExt;
use log::{error, info, trace};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::sync::{Mutex, MutexGuard};

use crate::error::ApiError;
use crate::filter;
use crate::protocol::{Envelope, ErrorCode};
use crate::resources::{self, Fields, Resource};
use crate::stats::{compute_stats, Stats};
use crate::store::{create_store, StorageConfig, Store};
use crate::types::{Donation, Pet, Volunteer};

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u32 {
    3000
}
fn default_static_dir() -> String {
    ".".to_string()
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PawtnerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u32,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Serialize load-mutate-save of write requests. When off, concurrent
    /// writes race and the last save wins.
    #[serde(default)]
    pub serialize_writes: bool,
}

impl Default for PawtnerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            storage: StorageConfig::default(),
            static_dir: default_static_dir(),
            serialize_writes: false,
        }
    }
}

#[derive(Clone)]
pub struct Pawtner {
    store: Arc<dyn Store>,
    host: String,
    port: u32,
    static_dir: PathBuf,
    write_lock: Option<Arc<Mutex<()>>>,
}

impl Pawtner {
    pub fn new(config: PawtnerConfig) -> Self {
        let store = create_store(config.storage.clone());
        Self::with_store(config, store)
    }

    pub fn with_store(config: PawtnerConfig, store: Arc<dyn Store>) -> Self {
        Self {
            store,
            host: config.host,
            port: config.port,
            static_dir: PathBuf::from(config.static_dir),
            write_lock: config
                .serialize_writes
                .then(|| Arc::new(Mutex::new(()))),
        }
    }

    async fn lock_writes(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.write_lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }

    // Resources

    async fn list<R: Resource>(
        &self,
        query: HashMap<String, String>,
    ) -> Result<Vec<R>, ApiError> {
        let mut doc = self.store.load().await;
        let records = std::mem::take(R::collection_mut(&mut doc));
        let records = filter::filter(records, &query);
        Ok(filter::apply_limit(records, filter::parse_limit(&query)))
    }

    async fn get<R: Resource>(&self, id: Option<i64>) -> Result<R, ApiError> {
        let doc = self.store.load().await;
        R::collection(&doc)
            .iter()
            .find(|record| Some(record.id()) == id)
            .cloned()
            .ok_or_else(not_found::<R>)
    }

    async fn create<R: Resource>(&self, fields: Fields) -> Result<R, ApiError> {
        resources::check_required::<R>(&fields)?;
        let _guard = self.lock_writes().await;
        let mut doc = self.store.load_for_write().await?;
        let records = R::collection_mut(&mut doc);
        let record = R::create(resources::next_id(records)?, &fields)?;
        records.push(record.clone());
        self.store.save(&doc).await?;
        trace!("pawtner: created {} {}", R::SINGULAR, record.id());
        Ok(record)
    }

    async fn update<R: Resource>(
        &self,
        id: Option<i64>,
        fields: Fields,
    ) -> Result<R, ApiError> {
        let _guard = self.lock_writes().await;
        let mut doc = self.store.load_for_write().await?;
        let Some(record) = R::collection_mut(&mut doc)
            .iter_mut()
            .find(|record| Some(record.id()) == id)
        else {
            return Err(not_found::<R>());
        };
        record.apply(resources::parse_update::<R>(fields)?);
        let record = record.clone();
        self.store.save(&doc).await?;
        trace!("pawtner: updated {} {}", R::SINGULAR, record.id());
        Ok(record)
    }

    async fn delete<R: Resource>(&self, id: Option<i64>) -> Result<R, ApiError> {
        let _guard = self.lock_writes().await;
        let mut doc = self.store.load_for_write().await?;
        let records = R::collection_mut(&mut doc);
        let Some(index) = records.iter().position(|r| Some(r.id()) == id) else {
            return Err(not_found::<R>());
        };
        let record = records.remove(index);
        self.store.save(&doc).await?;
        trace!("pawtner: deleted {} {}", R::SINGULAR, record.id());
        Ok(record)
    }

    async fn stats(&self) -> Result<Stats, ApiError> {
        let doc = self.store.load().await;
        Ok(compute_stats(&doc))
    }

    pub fn app(&self) -> Router {
        let router = Router::new()
            .route("/", get(index_page))
            .route("/index.html", get(index_page))
            .route("/service.html", get(service_page))
            .route("/availpets.html", get(availpets_page))
            .route("/api", get(api_info))
            .route("/api/stats", get(get_stats));
        let router = resource_routes::<Pet>(router);
        let router = resource_routes::<Volunteer>(router);
        let router = resource_routes::<Donation>(router);

        router
            .fallback(endpoint_not_found)
            .layer(middleware::from_fn(fault_boundary))
            .layer(middleware::from_fn(cors))
            .with_state(self.clone())
    }

    pub async fn run(&self) {
        let app = self.app();
        let host = format!("{}:{}", self.host, self.port);
        let listener = match tokio::net::TcpListener::bind(&host).await {
            Ok(listener) => listener,
            Err(err) => {
                error!("Could not bind {}: {}", host, err);
                return;
            }
        };
        self.print_banner();
        if let Err(err) = axum::serve(listener, app).await {
            error!("Server error: {}", err);
        }
    }

    fn print_banner(&self) {
        let url = format!("http://localhost:{}", self.port);
        info!("Pawtner Hope Foundation API Server running on {}", url);
        info!("HTML pages:");
        info!("- GET / or /index.html - Home page");
        info!("- GET /service.html - Services page");
        info!("- GET /availpets.html - Available pets page");
        info!("API endpoints:");
        info!("- GET /api - API information");
        for resource in [Pet::PLURAL, Volunteer::PLURAL, Donation::PLURAL] {
            info!("- GET|POST /api/{}", resource);
            info!("- GET|PUT|DELETE /api/{}/:id", resource);
        }
        info!("- GET /api/stats - Get comprehensive statistics");
        info!("Data is stored in: {}", self.store.location());
    }
}

fn not_found<R: Resource>() -> ApiError {
    ApiError::not_found(&format!("{} not found", R::TITLE))
}

fn resource_routes<R: Resource>(
    router: Router<Pawtner>,
) -> Router<Pawtner> {
    let base = format!("/api/{}", R::PLURAL);
    router
        .route(&base, get(list::<R>).post(create::<R>))
        .route(
            &format!("{}/:id", base),
            get(get_one::<R>).put(update::<R>).delete(delete::<R>),
        )
}

// Fault boundary: a panicking handler answers with a 500 envelope

async fn fault_boundary(req: Request, next: Next) -> Response {
    match AssertUnwindSafe(next.run(req)).catch_unwind().await {
        Ok(res) => res,
        Err(panic) => {
            let cause = if let Some(msg) = panic.downcast_ref::<&str>() {
                msg.to_string()
            } else if let Some(msg) = panic.downcast_ref::<String>() {
                msg.clone()
            } else {
                "unknown panic".to_string()
            };
            error!("Request handler panicked: {}", cause);
            api_err_response(ApiError::internal("Something went wrong!", &cause))
        }
    }
}

// Cors middleware

async fn cors(req: Request, next: Next) -> Response {
    let mut res = if req.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(req).await
    };
    let headers = res.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type, Authorization"),
    );
    res
}

// Api response helpers

#[derive(Serialize)]
struct ApiErrorBody {
    success: bool,
    #[serde(flatten)]
    error: ApiError,
}

fn api_err_response(error: ApiError) -> Response {
    let status = match error.code {
        ErrorCode::BadRequest => StatusCode::BAD_REQUEST,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let body = Json(ApiErrorBody {
        success: false,
        error,
    });
    (status, body).into_response()
}

fn api_response<T>(status: StatusCode, result: Result<T, ApiError>) -> Response
where
    T: Serialize,
{
    match result {
        Ok(res) => (status, Json(res)).into_response(),
        Err(err) => api_err_response(err),
    }
}

// Request body: json or url-encoded form, as a flat field map

pub struct Payload(pub Fields);

fn invalid_body() -> Response {
    api_err_response(ApiError::bad_request("Invalid request body"))
}

#[async_trait]
impl<S> FromRequest<S> for Payload
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Response> {
        let is_form = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| {
                value.starts_with("application/x-www-form-urlencoded")
            });
        if is_form {
            let Form(form) =
                Form::<HashMap<String, String>>::from_request(req, state)
                    .await
                    .map_err(|_| invalid_body())?;
            let fields = form
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect();
            return Ok(Payload(fields));
        }

        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| invalid_body())?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Payload(Map::new()));
        }
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(fields)) => Ok(Payload(fields)),
            _ => Err(invalid_body()),
        }
    }
}

/// Leading integer of a path id, so `12abc` and `12.5` both select 12.
fn parse_id(id: &str) -> Option<i64> {
    let id = id.trim_start();
    let end = id
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+'))))
        .map_or(id.len(), |(i, _)| i);
    id[..end].parse().ok()
}

// Resource handlers

async fn list<R: Resource>(
    State(state): State<Pawtner>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let res = state
        .list::<R>(query)
        .await
        .map(Envelope::list)
        .map_err(|err| err.context(&format!("Error fetching {}", R::PLURAL)));
    api_response(StatusCode::OK, res)
}

async fn get_one<R: Resource>(
    State(state): State<Pawtner>,
    Path(id): Path<String>,
) -> Response {
    let res = state
        .get::<R>(parse_id(&id))
        .await
        .map(Envelope::data)
        .map_err(|err| err.context(&format!("Error fetching {}", R::SINGULAR)));
    api_response(StatusCode::OK, res)
}

async fn create<R: Resource>(
    State(state): State<Pawtner>,
    Payload(fields): Payload,
) -> Response {
    let res = state
        .create::<R>(fields)
        .await
        .map(|record| {
            Envelope::with_message(
                record,
                format!("{} created successfully", R::TITLE),
            )
        })
        .map_err(|err| err.context(&format!("Error creating {}", R::SINGULAR)));
    api_response(StatusCode::CREATED, res)
}

async fn update<R: Resource>(
    State(state): State<Pawtner>,
    Path(id): Path<String>,
    Payload(fields): Payload,
) -> Response {
    let res = state
        .update::<R>(parse_id(&id), fields)
        .await
        .map(|record| {
            Envelope::with_message(
                record,
                format!("{} updated successfully", R::TITLE),
            )
        })
        .map_err(|err| err.context(&format!("Error updating {}", R::SINGULAR)));
    api_response(StatusCode::OK, res)
}

async fn delete<R: Resource>(
    State(state): State<Pawtner>,
    Path(id): Path<String>,
) -> Response {
    let res = state
        .delete::<R>(parse_id(&id))
        .await
        .map(|record| {
            Envelope::with_message(
                record,
                format!("{} deleted successfully", R::TITLE),
            )
        })
        .map_err(|err| err.context(&format!("Error deleting {}", R::SINGULAR)));
    api_response(StatusCode::OK, res)
}

async fn get_stats(State(state): State<Pawtner>) -> Response {
    let res = state
        .stats()
        .await
        .map(Envelope::data)
        .map_err(|err| err.context("Error fetching statistics"));
    api_response(StatusCode::OK, res)
}

async fn api_info() -> Json<Value> {
    Json(json!({
        "message": "Welcome to Pawtner Hope Foundation API",
        "version": "2.0.0",
        "endpoints": {
            "GET /api/pets": "Get all pets with optional filters",
            "GET /api/pets/:id": "Get a pet by ID",
            "POST /api/pets": "Create a new pet",
            "PUT /api/pets/:id": "Update a pet by ID",
            "DELETE /api/pets/:id": "Delete a pet by ID",
            "GET /api/volunteers": "Get all volunteers with optional filters",
            "GET /api/volunteers/:id": "Get a volunteer by ID",
            "POST /api/volunteers": "Create a new volunteer",
            "PUT /api/volunteers/:id": "Update a volunteer by ID",
            "DELETE /api/volunteers/:id": "Delete a volunteer by ID",
            "GET /api/donations": "Get all donations with optional filters",
            "GET /api/donations/:id": "Get a donation by ID",
            "POST /api/donations": "Create a new donation",
            "PUT /api/donations/:id": "Update a donation by ID",
            "DELETE /api/donations/:id": "Delete a donation by ID",
            "GET /api/stats": "Get statistics"
        }
    }))
}

async fn endpoint_not_found() -> Response {
    let body = json!({
        "success": false,
        "message": "Endpoint not found",
        "availableEndpoints": "/api"
    });
    (StatusCode::NOT_FOUND, Json(body)).into_response()
}

// Html pages

async fn html_page(state: &Pawtner, file: &str, missing: &'static str) -> Response {
    let path = state.static_dir.join(file);
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => (
            [(header::CONTENT_TYPE, "text/html")],
            Body::from(content),
        )
            .into_response(),
        Err(err) => {
            error!("Error reading {:?}: {}", path, err);
            (StatusCode::NOT_FOUND, missing).into_response()
        }
    }
}

async fn index_page(State(state): State<Pawtner>) -> Response {
    html_page(&state, "index.html", "HTML file not found").await
}

async fn service_page(State(state): State<Pawtner>) -> Response {
    html_page(&state, "service.html", "Service page not found").await
}

async fn availpets_page(State(state): State<Pawtner>) -> Response {
    html_page(&state, "availpets.html", "Available pets page not found").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config: PawtnerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.static_dir, ".");
        assert!(!config.serialize_writes);
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn config_camel_case_keys() {
        let config: PawtnerConfig = serde_json::from_str(
            r#"{
                "port": 8080,
                "staticDir": "public",
                "serializeWrites": true,
                "storage": { "kind": "memory", "seed": false }
            }"#,
        )
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.static_dir, "public");
        assert!(config.serialize_writes);
        assert_eq!(config.storage, StorageConfig::Memory { seed: false });
    }

    #[test]
    fn path_ids() {
        assert_eq!(parse_id("7"), Some(7));
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("1.5"), Some(1));
        assert_eq!(parse_id("12abc"), Some(12));
        assert_eq!(parse_id("-3"), Some(-3));
        assert_eq!(parse_id("-"), None);
        assert_eq!(parse_id(""), None);
    }

    #[tokio::test]
    async fn panicking_handler_becomes_internal_error() {
        let app = Router::new()
            .route(
                "/boom",
                get(|| async {
                    if true {
                        panic!("handler exploded");
                    }
                    "unreachable"
                }),
            )
            .layer(middleware::from_fn(fault_boundary));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let res = reqwest::get(format!("http://{}/boom", addr)).await.unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Something went wrong!");
        assert_eq!(body["error"], "handler exploded");
    }
}
