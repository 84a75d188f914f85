//! Image ingestion: accepts an uploaded image as a multipart part or an
//! embedded base64 data URL, validates the MIME type, derives a
//! collision-resistant storage key and persists the bytes to the configured
//! object-storage bucket with no-overwrite semantics. Unlike the menu store
//! there is no local fallback here: without storage configuration ingestion
//! fails outright, since silently writing large images to an ephemeral disk
//! would lose them between deployments.

use base64::Engine;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::StatusCode;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Logical folder all menu images live under inside the bucket.
const IMAGE_FOLDER: &str = "menu-items";

static DATA_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:(image/[a-zA-Z0-9.+-]+);base64,(.+)$").unwrap());

#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Parse an embedded `data:image/<subtype>;base64,<payload>` URL. Anything
/// else, including a data URL with no base64 body, is rejected before any
/// storage interaction.
pub fn parse_data_url(data_url: &str) -> AppResult<ImagePayload> {
    let caps = DATA_URL_RE
        .captures(data_url)
        .ok_or_else(|| AppError::validation("Invalid data URL."))?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&caps[2])
        .map_err(|_| AppError::validation("Invalid data URL."))?;
    Ok(ImagePayload { mime_type: caps[1].to_string(), bytes })
}

/// Map a MIME type to a file extension, rejecting anything outside `image/*`.
/// `jpeg` maps to `jpg`; other subtypes pass through unchanged.
pub fn extension_for(mime_type: &str) -> AppResult<&str> {
    let subtype = mime_type
        .strip_prefix("image/")
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::validation("Only image uploads are supported."))?;
    Ok(if subtype == "jpeg" { "jpg" } else { subtype })
}

/// Collision-resistant storage key: coarse timestamp plus a random unique
/// suffix, namespaced under the image folder.
pub fn storage_key(mime_type: &str) -> AppResult<String> {
    let extension = extension_for(mime_type)?;
    Ok(format!(
        "{IMAGE_FOLDER}/{}-{}.{extension}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4()
    ))
}

pub struct ObjectStorage {
    http: reqwest::Client,
    base: String,
    service_key: String,
    bucket: String,
}

fn storage_error(status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|v| {
            ["message", "error"]
                .iter()
                .find_map(|k| v.get(k).and_then(|m| m.as_str()).map(|s| s.to_string()))
        })
        .unwrap_or_else(|| format!("object storage error ({status})"));
    AppError::unavailable(message)
}

impl ObjectStorage {
    pub fn from_config(http: reqwest::Client, cfg: &Config) -> AppResult<Self> {
        match (&cfg.database_url, &cfg.service_key) {
            (Some(base), Some(service_key)) => Ok(Self {
                http,
                base: base.trim_end_matches('/').to_string(),
                service_key: service_key.clone(),
                bucket: cfg.storage_bucket.clone(),
            }),
            _ => Err(AppError::unavailable(
                "Object storage is not configured. SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY are required for image uploads.",
            )),
        }
    }

    /// Store bytes under `key`, refusing to overwrite an existing object.
    pub async fn upload(&self, key: &str, mime_type: &str, bytes: Vec<u8>) -> AppResult<()> {
        let resp = self
            .http
            .post(format!("{}/storage/v1/object/{}/{}", self.base, self.bucket, key))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("content-type", mime_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(storage_error(status, &body));
        }
        Ok(())
    }

    pub fn public_url(&self, key: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base, self.bucket, key)
    }

    /// Fetch a stored object; returns its content type and bytes.
    pub async fn download(&self, path: &str) -> AppResult<(String, Vec<u8>)> {
        let resp = self
            .http
            .get(format!("{}/storage/v1/object/{}/{}", self.base, self.bucket, path))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AppError::not_found("Image not found."));
        }
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = resp.bytes().await?.to_vec();
        Ok((content_type, bytes))
    }
}

/// Ingest an image payload end to end: validate, derive a key, persist and
/// return the durable public URL.
pub async fn ingest(storage: &ObjectStorage, payload: ImagePayload) -> AppResult<String> {
    let key = storage_key(&payload.mime_type)?;
    storage.upload(&key, &payload.mime_type, payload.bytes).await?;
    Ok(storage.public_url(&key))
}
