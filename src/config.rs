//! Environment-backed configuration snapshot.
//! `Config::from_env()` is cheap and is re-read at every capability probe so
//! operators can rotate credentials or extend the admin allow-list without a
//! restart. Only `http_port` and `data_dir` are fixed at startup.

use std::path::PathBuf;

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Server-only database/storage endpoint and service credential.
    pub database_url: Option<String>,
    pub service_key: Option<String>,
    /// Client-safe auth endpoint and anonymous key, used for auth calls only.
    pub auth_url: Option<String>,
    pub anon_key: Option<String>,
    /// Object-storage bucket for uploaded menu images.
    pub storage_bucket: String,
    /// Comma-separated admin email allow-list.
    pub admin_emails: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env_opt("SUPABASE_URL"),
            service_key: env_opt("SUPABASE_SERVICE_ROLE_KEY"),
            auth_url: env_opt("NEXT_PUBLIC_SUPABASE_URL"),
            anon_key: env_opt("NEXT_PUBLIC_SUPABASE_ANON_KEY"),
            storage_bucket: env_opt("SUPABASE_STORAGE_BUCKET")
                .unwrap_or_else(|| "menu-images".to_string()),
            admin_emails: std::env::var("ADMIN_EMAILS").unwrap_or_default(),
        }
    }

    /// True when the remote database can be constructed at all.
    pub fn has_database(&self) -> bool {
        self.database_url.is_some() && self.service_key.is_some()
    }

    /// True when the hosted auth service can be constructed at all.
    pub fn has_auth(&self) -> bool {
        self.auth_url.is_some() && self.anon_key.is_some()
    }
}

/// HTTP port, default 7878.
pub fn http_port() -> u16 {
    env_opt("FRESHSTART_HTTP_PORT")
        .and_then(|v| v.parse().ok())
        .unwrap_or(7878)
}

/// Root directory for the local fallback store, default "data".
pub fn data_dir() -> PathBuf {
    PathBuf::from(env_opt("FRESHSTART_DATA_DIR").unwrap_or_else(|| "data".to_string()))
}
