//! Local JSON-file fallback backend.
//! A single `menu-items.json` under the configured data dir holds the whole
//! store; every operation is a read-modify-write of that file under a
//! process-wide lock so serialized writers never lose committed writes.
//! When the primary data dir is not writable (read-only deployment roots)
//! the store falls back to a directory under the OS temp dir, mirroring how
//! serverless deployments only allow writes under /tmp.

use std::path::{Path, PathBuf};

use chrono::Utc;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::menu::{display_order, MenuItem, MenuItemDraft, MenuItemPatch};

const DATA_FILE: &str = "menu-items.json";

// One lock for the whole process: the file is shared state, the instances are not.
static FILE_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Resolve the backing file, creating its directory on demand. Falls back
    /// to `<tmp>/data` when the primary dir cannot be created.
    fn data_file(&self) -> AppResult<PathBuf> {
        if std::fs::create_dir_all(&self.dir).is_ok() {
            return Ok(self.dir.join(DATA_FILE));
        }
        let fallback = std::env::temp_dir().join("data");
        warn!(target: "store", "data dir {} is not writable, falling back to {}",
            self.dir.display(), fallback.display());
        std::fs::create_dir_all(&fallback)
            .map_err(|e| AppError::unavailable(format!(
                "Cannot write to filesystem. Tried {} and {}: {}",
                self.dir.display(), fallback.display(), e
            )))?;
        Ok(fallback.join(DATA_FILE))
    }

    fn read_all(&self, file: &Path) -> AppResult<Vec<MenuItem>> {
        if !file.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(file)
            .map_err(|e| AppError::unavailable(format!("menu store read failed: {e}")))?;
        let items: Vec<MenuItem> = serde_json::from_str(&raw)
            .map_err(|e| AppError::internal(format!("menu store is corrupt: {e}")))?;
        Ok(items)
    }

    fn write_all(&self, file: &Path, items: &[MenuItem]) -> AppResult<()> {
        let raw = serde_json::to_string_pretty(items)
            .map_err(|e| AppError::internal(e.to_string()))?;
        std::fs::write(file, raw)
            .map_err(|e| AppError::unavailable(format!("menu store write failed: {e}")))
    }

    pub fn list(&self) -> AppResult<Vec<MenuItem>> {
        let _guard = FILE_LOCK.lock();
        let file = self.data_file()?;
        let mut items = self.read_all(&file)?;
        items.sort_by(display_order);
        Ok(items)
    }

    pub fn create(&self, draft: MenuItemDraft) -> AppResult<MenuItem> {
        draft.validate()?;
        let item = MenuItem {
            id: Uuid::new_v4().to_string(),
            section_slug: draft.section_slug,
            name: draft.name,
            description: draft.description,
            price: draft.price,
            image: draft.image,
            sort_order: draft.sort_order,
            created_at: Utc::now(),
        };
        let _guard = FILE_LOCK.lock();
        let file = self.data_file()?;
        let mut items = self.read_all(&file)?;
        items.insert(0, item.clone());
        self.write_all(&file, &items)?;
        debug!(target: "store", "created menu item {} in {}", item.id, file.display());
        Ok(item)
    }

    pub fn update(&self, id: &str, patch: &MenuItemPatch) -> AppResult<MenuItem> {
        let _guard = FILE_LOCK.lock();
        let file = self.data_file()?;
        let mut items = self.read_all(&file)?;
        let Some(item) = items.iter_mut().find(|item| item.id == id) else {
            return Err(AppError::not_found("Item not found."));
        };
        item.apply(patch);
        let updated = item.clone();
        self.write_all(&file, &items)?;
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> AppResult<()> {
        let _guard = FILE_LOCK.lock();
        let file = self.data_file()?;
        let mut items = self.read_all(&file)?;
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Err(AppError::not_found("Item not found."));
        }
        self.write_all(&file, &items)
    }

    pub fn clear(&self) -> AppResult<()> {
        let _guard = FILE_LOCK.lock();
        let file = self.data_file()?;
        self.write_all(&file, &[])
    }
}
