//!
//! Menu item persistence
//! ---------------------
//! Two interchangeable backends behind one contract: a remote database
//! reached over its REST API, and a local JSON-file store used when the
//! database is not configured. Selection is a runtime capability check made
//! on every store invocation, not a static switch: handlers ask the selector
//! for a backend, the selector probes the environment, and callers never see
//! the fallback decision as an error. Both backends enforce the same
//! ordering and uniqueness invariants.

use std::path::PathBuf;

use tracing::debug;

use crate::config::Config;
use crate::error::AppResult;
use crate::menu::{MenuItem, MenuItemDraft, MenuItemPatch};

mod local;
mod remote;

pub use local::LocalStore;
pub use remote::RemoteStore;

/// Tagged backend variant produced by the capability probe.
pub enum Backend {
    Remote(RemoteStore),
    Local(LocalStore),
}

impl Backend {
    pub async fn list(&self) -> AppResult<Vec<MenuItem>> {
        match self {
            Backend::Remote(s) => s.list().await,
            Backend::Local(s) => s.list(),
        }
    }

    pub async fn create(&self, draft: MenuItemDraft) -> AppResult<MenuItem> {
        match self {
            Backend::Remote(s) => s.create(draft).await,
            Backend::Local(s) => s.create(draft),
        }
    }

    pub async fn update(&self, id: &str, patch: &MenuItemPatch) -> AppResult<MenuItem> {
        match self {
            Backend::Remote(s) => s.update(id, patch).await,
            Backend::Local(s) => s.update(id, patch),
        }
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        match self {
            Backend::Remote(s) => s.delete(id).await,
            Backend::Local(s) => s.delete(id),
        }
    }

    pub async fn clear(&self) -> AppResult<()> {
        match self {
            Backend::Remote(s) => s.clear().await,
            Backend::Local(s) => s.clear(),
        }
    }
}

/// Capability-checked factory. Probes the environment on every call so a
/// credential rotation or a fresh deployment picks the right backend without
/// a restart. The probe outcome is logged for operability but is never an
/// error from the caller's point of view.
pub struct StoreSelector {
    http: reqwest::Client,
    data_dir: PathBuf,
}

impl StoreSelector {
    pub fn new(http: reqwest::Client, data_dir: PathBuf) -> Self {
        Self { http, data_dir }
    }

    pub fn select(&self) -> Backend {
        let cfg = Config::from_env();
        match RemoteStore::from_config(self.http.clone(), &cfg) {
            Some(remote) => {
                debug!(target: "store", "using remote database backend");
                Backend::Remote(remote)
            }
            None => {
                debug!(target: "store", "remote database not configured, using local store at {}",
                    self.data_dir.display());
                Backend::Local(LocalStore::new(self.data_dir.clone()))
            }
        }
    }
}
