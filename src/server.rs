//!
//! freshstart HTTP server
//! ----------------------
//! This module defines the Axum-based HTTP API for the storefront backend.
//!
//! Responsibilities:
//! - Menu item CRUD delegating to the capability-selected store backend.
//! - Image upload and download endpoints backed by object storage.
//! - Login/logout endpoints that exchange credentials at the auth service
//!   and manage the HTTP-only admin session cookie.
//! - A 60-second read-through cache in front of the public list endpoint,
//!   invalidated by every write.
//! - Placeholder pages for the admin area; real page rendering lives in the
//!   storefront frontend, the paths exist so the gate's redirect semantics
//!   hold end to end.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{FromRequest, Multipart, Query, Request, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::info;

use crate::cache::ListCache;
use crate::config::{self, Config};
use crate::error::{AppError, AppResult};
use crate::gate::{self, ADMIN_COOKIE};
use crate::identity::{AuthService, HostedAuth};
use crate::images::{self, ImagePayload, ObjectStorage};
use crate::menu::{normalize_price, MenuItemDraft, MenuItemPatch};
use crate::store::StoreSelector;

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub stores: Arc<StoreSelector>,
    pub auth: Arc<dyn AuthService>,
    pub cache: Arc<ListCache>,
    pub http: reqwest::Client,
}

impl AppState {
    /// Production state: hosted auth service, data dir from the environment.
    pub fn from_env() -> Self {
        let http = reqwest::Client::new();
        let auth = Arc::new(HostedAuth::new(http.clone()));
        Self::build(config::data_dir(), auth, http)
    }

    /// State with an injected auth service, used by integration tests.
    pub fn new(data_dir: impl Into<PathBuf>, auth: Arc<dyn AuthService>) -> Self {
        Self::build(data_dir.into(), auth, reqwest::Client::new())
    }

    fn build(data_dir: PathBuf, auth: Arc<dyn AuthService>, http: reqwest::Client) -> Self {
        Self {
            stores: Arc::new(StoreSelector::new(http.clone(), data_dir)),
            auth,
            cache: Arc::new(ListCache::default()),
            http,
        }
    }
}

/// Mount all routes and the admin gate.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "freshstart ok" }))
        .route("/admin/login", get(admin_login_page))
        .route("/ekle", get(add_page))
        .route(
            "/api/menu-items",
            get(list_items).post(create_item).put(update_item).delete(delete_items),
        )
        .route("/api/uploads", post(upload_image))
        .route("/api/images", get(get_image))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .layer(axum::middleware::from_fn_with_state(state.clone(), gate::admin_gate))
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    let state = AppState::from_env();
    let addr: SocketAddr = format!("0.0.0.0:{}", config::http_port()).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}

// Rendering is owned by the storefront frontend; these placeholders keep the
// admin paths routable so redirects land somewhere sensible.
async fn admin_login_page() -> Html<&'static str> {
    Html("<!doctype html><title>freshstart</title><p>admin login</p>")
}

async fn add_page() -> Html<&'static str> {
    Html("<!doctype html><title>freshstart</title><p>menu admin</p>")
}

async fn list_items(State(state): State<AppState>) -> AppResult<Json<JsonValue>> {
    if let Some(items) = state.cache.get() {
        return Ok(Json(json!({ "items": items })));
    }
    let items = state.stores.select().list().await?;
    state.cache.put(items.clone());
    Ok(Json(json!({ "items": items })))
}

async fn create_item(
    State(state): State<AppState>,
    Json(mut draft): Json<MenuItemDraft>,
) -> AppResult<Json<JsonValue>> {
    draft.validate()?;
    draft.price = normalize_price(&draft.price);
    let item = state.stores.select().create(draft).await?;
    state.cache.invalidate();
    Ok(Json(json!({ "item": item })))
}

#[derive(Deserialize)]
struct UpdateRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(flatten)]
    patch: MenuItemPatch,
}

async fn update_item(
    State(state): State<AppState>,
    Json(request): Json<UpdateRequest>,
) -> AppResult<Json<JsonValue>> {
    let id = request
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::validation("Missing id."))?;
    let mut patch = request.patch;
    if let Some(price) = &patch.price {
        patch.price = Some(normalize_price(price));
    }
    let item = state.stores.select().update(&id, &patch).await?;
    state.cache.invalidate();
    Ok(Json(json!({ "item": item })))
}

#[derive(Deserialize)]
struct DeleteParams {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    all: Option<String>,
}

async fn delete_items(
    State(state): State<AppState>,
    Query(params): Query<DeleteParams>,
) -> AppResult<Json<JsonValue>> {
    let backend = state.stores.select();
    if params.all.as_deref() == Some("1") {
        backend.clear().await?;
        state.cache.invalidate();
        return Ok(Json(json!({ "ok": true })));
    }
    let id = params
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::validation("Missing id."))?;
    backend.delete(&id).await?;
    state.cache.invalidate();
    Ok(Json(json!({ "ok": true })))
}

async fn image_from_multipart(mut multipart: Multipart) -> AppResult<ImagePayload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(e.to_string()))?
    {
        if field.name() == Some("file") {
            // Parts without a declared type are treated as JPEG photos.
            let mime_type = field.content_type().unwrap_or("image/jpeg").to_string();
            // Reject non-image parts here so the storage configuration is
            // never consulted for a payload that is invalid anyway.
            images::extension_for(&mime_type)?;
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(e.to_string()))?;
            return Ok(ImagePayload { mime_type, bytes: bytes.to_vec() });
        }
    }
    Err(AppError::validation("Missing file."))
}

#[derive(Deserialize)]
struct UploadBody {
    #[serde(rename = "dataUrl", default)]
    data_url: Option<String>,
}

async fn upload_image(
    State(state): State<AppState>,
    request: Request,
) -> AppResult<Json<JsonValue>> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let payload = if content_type.starts_with("multipart/form-data") {
        let multipart = Multipart::from_request(request, &())
            .await
            .map_err(|_| AppError::validation("Missing file."))?;
        image_from_multipart(multipart).await?
    } else {
        let Json(body) = Json::<UploadBody>::from_request(request, &())
            .await
            .map_err(|_| AppError::validation("Missing dataUrl."))?;
        let data_url = body
            .data_url
            .ok_or_else(|| AppError::validation("Missing dataUrl."))?;
        images::parse_data_url(&data_url)?
    };

    let storage = ObjectStorage::from_config(state.http.clone(), &Config::from_env())?;
    let url = images::ingest(&storage, payload).await?;
    Ok(Json(json!({ "url": url })))
}

#[derive(Deserialize)]
struct ImageQuery {
    #[serde(default)]
    path: Option<String>,
}

async fn get_image(
    State(state): State<AppState>,
    Query(query): Query<ImageQuery>,
) -> AppResult<Response> {
    let path = query
        .path
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| AppError::validation("Missing path."))?;
    let storage = ObjectStorage::from_config(state.http.clone(), &Config::from_env())?;
    let (content_type, bytes) = storage.download(&path).await?;
    Ok((
        [
            (CONTENT_TYPE, content_type),
            (CACHE_CONTROL, "public, max-age=31536000, immutable".to_string()),
        ],
        bytes,
    )
        .into_response())
}

#[derive(Deserialize)]
struct LoginPayload {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

// The token comes from the external auth provider; anything outside
// header-safe bytes must surface as a mapped error, not a panic.
fn session_cookie(token: &str, max_age: u64) -> AppResult<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{ADMIN_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}"
    ))
    .map_err(|_| AppError::internal("Auth service returned a malformed token."))
}

fn clear_session_cookie() -> AppResult<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{ADMIN_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0"
    ))
    .map_err(|_| AppError::internal("Could not build session cookie."))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<(HeaderMap, Json<JsonValue>)> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::validation("Email and password are required."));
    }
    let token = state.auth.sign_in(&payload.email, &payload.password).await?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, session_cookie(&token.access_token, token.expires_in)?);
    Ok((headers, Json(json!({ "ok": true }))))
}

async fn logout() -> AppResult<(HeaderMap, Json<JsonValue>)> {
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, clear_session_cookie()?);
    Ok((headers, Json(json!({ "ok": true }))))
}
