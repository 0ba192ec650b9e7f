//! MongoDB implementation of UserRepository

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{Collection, Database, bson::doc};
use tracing::instrument;

use crate::error::UserResult;
use crate::models::UserRecord;
use crate::repository::UserRepository;

pub const DEFAULT_COLLECTION: &str = "users";

/// Stores one document per user with the username as `_id`, so uniqueness is
/// enforced by the primary index and no extra index is needed.
pub struct MongoUserRepository {
    collection: Collection<UserRecord>,
}

impl MongoUserRepository {
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let repo = MongoUserRepository::new(&client.database("identity"));
    /// ```
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, DEFAULT_COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<UserRecord>(collection_name),
        }
    }

    pub fn collection(&self) -> &Collection<UserRecord> {
        &self.collection
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> UserResult<Option<UserRecord>> {
        let record = self.collection.find_one(doc! { "_id": username }).await?;
        Ok(record)
    }

    #[instrument(skip(self, record), fields(username = %record.username))]
    async fn save(&self, record: UserRecord) -> UserResult<UserRecord> {
        let result = self
            .collection
            .replace_one(doc! { "_id": record.username.as_str() }, &record)
            .upsert(true)
            .await?;

        tracing::debug!(
            matched = result.matched_count,
            upserted = result.upserted_id.is_some(),
            "User saved"
        );
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn find_all(&self) -> UserResult<Vec<UserRecord>> {
        let cursor = self.collection.find(doc! {}).await?;
        let records: Vec<UserRecord> = cursor.try_collect().await?;
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, RoleSet};
    use mongodb::Client;

    async fn repository() -> MongoUserRepository {
        let url = std::env::var("MONGODB_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = Client::with_uri_str(&url).await.unwrap();
        let db = client.database("identity_test");
        let repo = MongoUserRepository::with_collection(&db, "users_repository_test");
        repo.collection().drop().await.unwrap();
        repo
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_save_find_and_upsert() {
        let repo = repository().await;
        assert!(repo.find_by_username("bob").await.unwrap().is_none());

        let record = UserRecord::new("bob".into(), "hash".into(), "Bob".into(), RoleSet::empty());
        repo.save(record.clone()).await.unwrap();

        let mut replacement = record.clone();
        replacement.roles = Role::Admin.into();
        repo.save(replacement).await.unwrap();

        let all = repo.find_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].roles.contains(Role::Admin));
    }
}
