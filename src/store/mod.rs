mod file;
mod memory;

use async_trait::async_trait;
use log::info;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use crate::models::auth::User;

pub use self::file::FileSessionStore;
pub use self::memory::MemorySessionStore;

/// Key the signed-in user is stored under.
pub const SESSION_KEY: &str = "rxgenie_user";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("session store holds invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistence for the authenticated user, rehydrated on startup.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<User>, StoreError>;

    async fn save(&self, user: &User) -> Result<(), StoreError>;

    async fn clear(&self) -> Result<(), StoreError>;
}

pub fn initialize_session_store(path: &Path) -> Arc<dyn SessionStore> {
    info!("Signed-in user will be stored in: {}", path.display());
    Arc::new(FileSessionStore::new(path))
}
