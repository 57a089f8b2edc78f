use async_trait::async_trait;
use std::sync::Mutex;

use super::{ SessionStore, StoreError };
use crate::models::auth::User;

#[derive(Debug, Default)]
pub struct MemorySessionStore {
    user: Mutex<Option<User>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: User) -> Self {
        Self { user: Mutex::new(Some(user)) }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<User>> {
        self.user.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self) -> Result<Option<User>, StoreError> {
        Ok(self.slot().clone())
    }

    async fn save(&self, user: &User) -> Result<(), StoreError> {
        *self.slot() = Some(user.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.slot() = None;
        Ok(())
    }
}
