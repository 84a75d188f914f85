//! Remote database backend over the hosted REST API.
//! Rows live in the `menu_items` table with storage-native snake_case
//! columns; ordering is pushed down to the database with the same dual-key
//! policy the local backend applies in memory. The service credential is
//! sent as both `apikey` and bearer token.

use chrono::{DateTime, Utc};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{json, Map, Value as JsonValue};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::menu::{Localized, MenuItem, MenuItemDraft, MenuItemPatch};

const TABLE: &str = "menu_items";

pub struct RemoteStore {
    http: reqwest::Client,
    base: String,
    service_key: String,
}

/// Storage-native row shape. `id` and `price` are kept loose because hosted
/// schemas commonly use numeric ids and numeric prices; both are normalized
/// to strings at the API boundary.
#[derive(Debug, Deserialize)]
struct Row {
    id: JsonValue,
    #[serde(default)]
    section_slug: Option<String>,
    #[serde(default)]
    name: Option<Localized>,
    #[serde(default)]
    description: Option<Localized>,
    #[serde(default)]
    price: Option<JsonValue>,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    sort_order: Option<i64>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

fn scalar_to_string(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl Row {
    fn into_item(self) -> MenuItem {
        MenuItem {
            id: scalar_to_string(&self.id),
            section_slug: self.section_slug.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            price: self.price.as_ref().map(scalar_to_string).unwrap_or_default(),
            image: self.image.unwrap_or_default(),
            sort_order: self.sort_order,
            created_at: self.created_at.unwrap_or(DateTime::UNIX_EPOCH),
        }
    }
}

/// Pull the `message` out of a REST error body, best effort.
fn rest_error(status: StatusCode, body: &str) -> AppError {
    let message = serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(|s| s.to_string()))
        .unwrap_or_else(|| format!("database error ({status})"));
    AppError::unavailable(message)
}

impl RemoteStore {
    /// Capability probe: only constructible when both the endpoint and the
    /// service credential are configured.
    pub fn from_config(http: reqwest::Client, cfg: &Config) -> Option<Self> {
        let base = cfg.database_url.clone()?;
        let service_key = cfg.service_key.clone()?;
        Some(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
            service_key,
        })
    }

    fn request(&self, method: Method) -> RequestBuilder {
        self.http
            .request(method, format!("{}/rest/v1/{}", self.base, TABLE))
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn rows_or_error(resp: reqwest::Response) -> AppResult<Vec<Row>> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(rest_error(status, &body));
        }
        Ok(resp.json().await?)
    }

    pub async fn list(&self) -> AppResult<Vec<MenuItem>> {
        let resp = self
            .request(Method::GET)
            .query(&[
                ("select", "*"),
                ("order", "sort_order.asc.nullslast,created_at.desc"),
            ])
            .send()
            .await?;
        let rows = Self::rows_or_error(resp).await?;
        Ok(rows.into_iter().map(Row::into_item).collect())
    }

    pub async fn create(&self, draft: MenuItemDraft) -> AppResult<MenuItem> {
        draft.validate()?;
        let payload = json!({
            "section_slug": draft.section_slug,
            "name": draft.name,
            "description": draft.description,
            "price": draft.price,
            "image": draft.image,
            "sort_order": draft.sort_order,
        });
        let resp = self
            .request(Method::POST)
            .header("Prefer", "return=representation")
            .json(&payload)
            .send()
            .await?;
        let rows = Self::rows_or_error(resp).await?;
        rows.into_iter()
            .next()
            .map(Row::into_item)
            .ok_or_else(|| AppError::unavailable("database returned no row for insert"))
    }

    pub async fn update(&self, id: &str, patch: &MenuItemPatch) -> AppResult<MenuItem> {
        // Only fields present in the patch reach the database, so omitted
        // fields keep their stored values.
        let mut payload = Map::new();
        if let Some(v) = &patch.section_slug { payload.insert("section_slug".into(), json!(v)); }
        if let Some(v) = &patch.name { payload.insert("name".into(), json!(v)); }
        if let Some(v) = &patch.description { payload.insert("description".into(), json!(v)); }
        if let Some(v) = &patch.price { payload.insert("price".into(), json!(v)); }
        if let Some(v) = &patch.image { payload.insert("image".into(), json!(v)); }
        if let Some(v) = patch.sort_order { payload.insert("sort_order".into(), json!(v)); }

        let resp = self
            .request(Method::PATCH)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(&JsonValue::Object(payload))
            .send()
            .await?;
        let rows = Self::rows_or_error(resp).await?;
        rows.into_iter()
            .next()
            .map(Row::into_item)
            .ok_or_else(|| AppError::not_found("Item not found."))
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let resp = self
            .request(Method::DELETE)
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .send()
            .await?;
        let rows = Self::rows_or_error(resp).await?;
        if rows.is_empty() {
            return Err(AppError::not_found("Item not found."));
        }
        Ok(())
    }

    pub async fn clear(&self) -> AppResult<()> {
        // Match every row: id=neq.<empty> is the catch-all filter.
        let resp = self
            .request(Method::DELETE)
            .query(&[("id", "neq.")])
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(rest_error(status, &body));
        }
        Ok(())
    }
}
