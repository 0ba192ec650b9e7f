use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::UserResult;
use crate::models::UserRecord;

/// Durable mapping from username to user record.
///
/// Implementations guarantee at most one record per username and make each
/// call atomic on its own. No atomicity is promised across calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a record by its exact username; a miss is `Ok(None)`.
    async fn find_by_username(&self, username: &str) -> UserResult<Option<UserRecord>>;

    /// Insert or fully replace the record keyed by `record.username`.
    async fn save(&self, record: UserRecord) -> UserResult<UserRecord>;

    /// Snapshot of every record, in no particular order.
    async fn find_all(&self) -> UserResult<Vec<UserRecord>>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, UserRecord>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> UserResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.get(username).cloned())
    }

    async fn save(&self, record: UserRecord) -> UserResult<UserRecord> {
        let mut users = self.users.write().await;
        users.insert(record.username.clone(), record.clone());

        tracing::debug!(username = %record.username, "Saved user");
        Ok(record)
    }

    async fn find_all(&self) -> UserResult<Vec<UserRecord>> {
        let users = self.users.read().await;
        Ok(users.values().cloned().collect())
    }
}
