//! Session persistence: the signed-in token and user.

use std::sync::Arc;

use tracing::warn;

use crate::api_client::User;
use crate::errors::ServiceError;
use crate::storage::KvStore;

pub const TOKEN_KEY: &str = "auth_token";
pub const USER_KEY: &str = "user";

#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KvStore>,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub async fn save_token(&self, token: &str) -> Result<(), ServiceError> {
        self.store.set_item(TOKEN_KEY, token.to_string()).await
    }

    pub async fn token(&self) -> Option<String> {
        self.store.get_item(TOKEN_KEY).await
    }

    pub async fn clear_token(&self) -> Result<(), ServiceError> {
        self.store.remove_item(TOKEN_KEY).await
    }

    pub async fn save_user(&self, user: &User) -> Result<(), ServiceError> {
        let raw = serde_json::to_string(user)?;
        self.store.set_item(USER_KEY, raw).await
    }

    /// Stored user, or `None` when absent or not valid JSON.
    pub async fn user(&self) -> Option<User> {
        let raw = self.store.get_item(USER_KEY).await?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "stored user is not valid JSON");
                None
            }
        }
    }

    pub async fn clear_user(&self) -> Result<(), ServiceError> {
        self.store.remove_item(USER_KEY).await
    }

    /// Clear both token and user.
    pub async fn sign_out(&self) -> Result<(), ServiceError> {
        self.clear_token().await?;
        self.clear_user().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JsonFileStore;

    fn user() -> User {
        User { id: 7, email: "a@example.com".into(), name: "Ada".into(), email_verified: true }
    }

    #[tokio::test]
    async fn token_and_user_round_trip_through_disk() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("session_{}.json", uuid::Uuid::new_v4()));
        let session = SessionStore::new(Arc::new(JsonFileStore::open(&tmp).await?));

        assert_eq!(session.token().await, None);
        session.save_token("tok-1").await?;
        session.save_user(&user()).await?;

        let reopened = SessionStore::new(Arc::new(JsonFileStore::open(&tmp).await?));
        assert_eq!(reopened.token().await.as_deref(), Some("tok-1"));
        assert_eq!(reopened.user().await, Some(user()));

        reopened.sign_out().await?;
        assert_eq!(reopened.token().await, None);
        assert_eq!(reopened.user().await, None);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_user_reads_as_none() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("session_{}.json", uuid::Uuid::new_v4()));
        let store = Arc::new(JsonFileStore::open(&tmp).await?);
        store.set_item(USER_KEY, "{oops".into()).await?;
        let session = SessionStore::new(store);
        assert_eq!(session.user().await, None);
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
