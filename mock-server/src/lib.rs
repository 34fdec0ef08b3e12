use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use axum::{
    body::Bytes,
    extract::{OriginalUri, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

/// Catalog name the service redirects to the caller's own catalog.
pub const DEFAULT_CATALOG: &str = "DefaultCatalog";
/// The catalog `DefaultCatalog` resolves to unless configured otherwise.
pub const REAL_CATALOG: &str = "contoso";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: Value,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub search_terms: String,
    pub total_results: usize,
    pub results: Vec<SearchResult>,
}

#[derive(Deserialize)]
pub struct ApiVersion {
    #[serde(rename = "api-version")]
    pub api_version: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub search_terms: String,
    pub count: Option<usize>,
    #[serde(rename = "api-version")]
    pub api_version: Option<String>,
}

#[derive(Deserialize)]
pub struct TokenForm {
    pub grant_type: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub resource: Option<String>,
}

/// Registered assets plus counters tests can inspect.
#[derive(Debug)]
pub struct MockCatalog {
    real_catalog: String,
    assets: RwLock<HashMap<String, Value>>,
    requests: AtomicUsize,
    redirects: AtomicUsize,
    tokens_issued: AtomicUsize,
}

impl MockCatalog {
    pub fn new(real_catalog: &str) -> Self {
        Self {
            real_catalog: real_catalog.to_string(),
            assets: RwLock::new(HashMap::new()),
            requests: AtomicUsize::new(0),
            redirects: AtomicUsize::new(0),
            tokens_issued: AtomicUsize::new(0),
        }
    }

    /// Catalog API requests received, redirected ones included.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }

    pub fn tokens_issued(&self) -> usize {
        self.tokens_issued.load(Ordering::SeqCst)
    }

    pub async fn asset_count(&self) -> usize {
        self.assets.read().await.len()
    }
}

impl Default for MockCatalog {
    fn default() -> Self {
        Self::new(REAL_CATALOG)
    }
}

pub type Db = Arc<MockCatalog>;

pub fn app() -> Router {
    app_with_state(Arc::new(MockCatalog::default()))
}

pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route("/catalogs/{catalog}/views/tables", post(register_asset))
        .route("/catalogs/{catalog}/views/tables/{id}", delete(delete_asset))
        .route("/catalogs/{catalog}/search/search", get(search_assets))
        .route("/{tenant}/oauth2/token", post(issue_token))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with_state(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(db)).await
}

fn error(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "error": { "code": code, "message": message } }))).into_response()
}

/// Checks shared by every catalog route: bearer auth, api-version, and the
/// `DefaultCatalog` redirect.
fn admit(
    db: &MockCatalog,
    headers: &HeaderMap,
    uri: &axum::http::Uri,
    catalog: &str,
    api_version: Option<&str>,
) -> Result<(), Response> {
    db.requests.fetch_add(1, Ordering::SeqCst);

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| !token.trim().is_empty());
    if !authorized {
        return Err(error(StatusCode::UNAUTHORIZED, "Unauthorized", "missing bearer token"));
    }

    if api_version.is_none_or(str::is_empty) {
        return Err(error(StatusCode::BAD_REQUEST, "MissingApiVersion", "api-version is required"));
    }

    if catalog == DEFAULT_CATALOG {
        db.redirects.fetch_add(1, Ordering::SeqCst);
        let path = uri.path().replacen(
            &format!("/catalogs/{DEFAULT_CATALOG}"),
            &format!("/catalogs/{}", db.real_catalog),
            1,
        );
        let location = match uri.query() {
            Some(q) => format!("{path}?{q}"),
            None => path,
        };
        debug!(%location, "redirecting default catalog");
        return Err((StatusCode::FOUND, [(header::LOCATION, location)]).into_response());
    }

    if catalog != db.real_catalog {
        return Err(error(StatusCode::NOT_FOUND, "CatalogNotFound", "no such catalog"));
    }
    Ok(())
}

async fn register_asset(
    State(db): State<Db>,
    Path(catalog): Path<String>,
    Query(params): Query<ApiVersion>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(resp) = admit(&db, &headers, &uri, &catalog, params.api_version.as_deref()) {
        return resp;
    }

    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len != body.len()) {
        return error(StatusCode::BAD_REQUEST, "LengthMismatch", "content-length does not match body");
    }

    let asset: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => return error(StatusCode::BAD_REQUEST, "InvalidPayload", &e.to_string()),
    };
    if !asset.get("name").is_some_and(Value::is_string) {
        return error(StatusCode::BAD_REQUEST, "InvalidPayload", "name is required");
    }

    // An asset with the same location is updated in place.
    let mut assets = db.assets.write().await;
    let existing = assets
        .iter()
        .find(|(_, v)| v.get("dsl") == asset.get("dsl"))
        .map(|(k, _)| k.clone());
    let (status, id) = match existing {
        Some(id) => (StatusCode::OK, id),
        None => (StatusCode::CREATED, format!("tables/{}", Uuid::new_v4().simple())),
    };
    assets.insert(id.clone(), asset);
    debug!(%id, "registered asset");
    (status, [(header::LOCATION, id)]).into_response()
}

async fn search_assets(
    State(db): State<Db>,
    Path(catalog): Path<String>,
    Query(params): Query<SearchParams>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = admit(&db, &headers, &uri, &catalog, params.api_version.as_deref()) {
        return resp;
    }

    let assets = db.assets.read().await;
    let mut results: Vec<SearchResult> = assets
        .iter()
        .filter(|(_, v)| matches_terms(v, &params.search_terms))
        .map(|(id, v)| SearchResult {
            id: id.clone(),
            kind: "Table".to_string(),
            content: v.clone(),
        })
        .collect();
    results.sort_by(|a, b| a.id.cmp(&b.id));
    let total_results = results.len();
    results.truncate(params.count.unwrap_or(10));

    Json(SearchResponse {
        search_terms: params.search_terms,
        total_results,
        results,
    })
    .into_response()
}

/// `name:=X` matches the name exactly, `name:X` and bare terms match a
/// case-insensitive substring of the name.
fn matches_terms(asset: &Value, terms: &str) -> bool {
    let name = asset.get("name").and_then(Value::as_str).unwrap_or_default();
    if let Some(exact) = terms.strip_prefix("name:=") {
        return name == exact;
    }
    let needle = terms.strip_prefix("name:").unwrap_or(terms).to_lowercase();
    name.to_lowercase().contains(&needle)
}

async fn delete_asset(
    State(db): State<Db>,
    Path((catalog, id)): Path<(String, String)>,
    Query(params): Query<ApiVersion>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = admit(&db, &headers, &uri, &catalog, params.api_version.as_deref()) {
        return resp;
    }
    match db.assets.write().await.remove(&format!("tables/{id}")) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => error(StatusCode::NOT_FOUND, "AssetNotFound", "no such asset"),
    }
}

async fn issue_token(State(db): State<Db>, Path(tenant): Path<String>, Form(form): Form<TokenForm>) -> Response {
    if form.grant_type != "client_credentials" {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "unsupported_grant_type" }))).into_response();
    }
    if form.client_secret.as_deref().is_none_or(str::is_empty) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid_client" }))).into_response();
    }
    let n = db.tokens_issued.fetch_add(1, Ordering::SeqCst) + 1;
    debug!(%tenant, client_id = %form.client_id, n, "issuing token");
    // Azure AD v1 endpoints send expires_in as a string.
    Json(json!({
        "token_type": "Bearer",
        "expires_in": "3599",
        "resource": form.resource.unwrap_or_default(),
        "access_token": format!("mock-token-{n}"),
    }))
    .into_response()
}
