use async_trait::async_trait;
use log::{ debug, warn };
use serde_json::{ Map, Value as JsonValue };
use std::io::ErrorKind;
use std::path::{ Path, PathBuf };

use super::{ SessionStore, StoreError, SESSION_KEY };
use crate::models::auth::User;

/// Keeps the user as `{"rxgenie_user": {...}}` in a small JSON file.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_entries(&self) -> Result<Map<String, JsonValue>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) if text.trim().is_empty() => Ok(Map::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_entries(&self, entries: &Map<String, JsonValue>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let text = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(&self.path, text).await?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn load(&self) -> Result<Option<User>, StoreError> {
        let mut entries = self.read_entries().await?;
        let Some(value) = entries.remove(SESSION_KEY) else {
            return Ok(None);
        };
        match serde_json::from_value::<User>(value) {
            Ok(user) => {
                debug!("Rehydrated user '{}' from {}", user.username, self.path.display());
                Ok(Some(user))
            }
            Err(e) => {
                warn!("Ignoring unreadable stored user in {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    async fn save(&self, user: &User) -> Result<(), StoreError> {
        let mut entries = self.read_entries().await.unwrap_or_default();
        entries.insert(SESSION_KEY.to_string(), serde_json::to_value(user)?);
        self.write_entries(&entries).await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        let mut entries = match self.read_entries().await {
            Ok(entries) => entries,
            Err(StoreError::Json(_)) => Map::new(),
            Err(e) => return Err(e),
        };
        entries.remove(SESSION_KEY);
        if entries.is_empty() {
            return match tokio::fs::remove_file(&self.path).await {
                Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            };
        }
        self.write_entries(&entries).await
    }
}
