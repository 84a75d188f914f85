//! Hosted auth service client: exchanges credentials for a session token and
//! resolves bearer tokens back to a principal. Configuration is re-read from
//! the environment on every call; a missing configuration or an unreachable
//! service is reported as `Unavailable`, never conflated with bad credentials.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use super::principal::Principal;
use crate::config::Config;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct SessionToken {
    pub access_token: String,
    /// Seconds until provider-side expiry; drives the cookie Max-Age.
    pub expires_in: u64,
}

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<SessionToken>;
    async fn resolve(&self, token: &str) -> AppResult<Principal>;
}

pub struct HostedAuth {
    http: reqwest::Client,
}

impl HostedAuth {
    pub fn new(http: reqwest::Client) -> Self { Self { http } }

    fn endpoint(&self) -> AppResult<(String, String)> {
        let cfg = Config::from_env();
        match (cfg.auth_url, cfg.anon_key) {
            (Some(url), Some(key)) => Ok((url.trim_end_matches('/').to_string(), key)),
            _ => Err(AppError::unavailable("Auth service is not configured.")),
        }
    }
}

#[derive(Deserialize)]
struct TokenGrant {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct UserPayload {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    app_metadata: JsonValue,
    #[serde(default)]
    user_metadata: JsonValue,
}

fn role_of(metadata: &JsonValue) -> Option<String> {
    metadata.get("role").and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// Pull a human-readable message out of an auth error body, best effort.
fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<JsonValue>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|k| v.get(k).and_then(|m| m.as_str()).map(|s| s.to_string()))
        })
        .unwrap_or_else(|| fallback.to_string())
}

#[async_trait]
impl AuthService for HostedAuth {
    async fn sign_in(&self, email: &str, password: &str) -> AppResult<SessionToken> {
        let (base, anon_key) = self.endpoint()?;
        let resp = self
            .http
            .post(format!("{base}/auth/v1/token?grant_type=password"))
            .header("apikey", &anon_key)
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            let grant: TokenGrant = resp.json().await?;
            return Ok(SessionToken {
                access_token: grant.access_token,
                expires_in: grant.expires_in.unwrap_or(3600),
            });
        }
        let body = resp.text().await.unwrap_or_default();
        if status.is_client_error() {
            debug!(target: "auth", "sign_in rejected for {email}: {status}");
            Err(AppError::authentication(error_message(&body, "Login failed.")))
        } else {
            warn!(target: "auth", "auth service error on sign_in: {status}");
            Err(AppError::unavailable(error_message(&body, "Auth service error.")))
        }
    }

    async fn resolve(&self, token: &str) -> AppResult<Principal> {
        let (base, anon_key) = self.endpoint()?;
        let resp = self
            .http
            .get(format!("{base}/auth/v1/user"))
            .header("apikey", &anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            let user: UserPayload = resp.json().await?;
            return Ok(Principal {
                user_id: user.id,
                email: user.email,
                app_role: role_of(&user.app_metadata),
                user_role: role_of(&user.user_metadata),
            });
        }
        if status.is_client_error() {
            Err(AppError::authentication("Unauthorized."))
        } else {
            warn!(target: "auth", "auth service error on resolve: {status}");
            Err(AppError::unavailable("Auth service error."))
        }
    }
}
