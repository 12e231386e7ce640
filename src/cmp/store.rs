use async_trait::async_trait;
use chrono::NaiveDateTime;
use rocket::tokio::sync::RwLock;
use uuid::Uuid;

use super::channels::Channel;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sql(#[from] sqlx::Error),
    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("Malformed comments document: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Document storage for channels. Each channel is stored whole, comments
/// included.
#[async_trait]
pub trait ChannelStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Channel>, StoreError>;

    /// Every channel, in whatever order the backend keeps them.
    async fn find_all(&self) -> Result<Vec<Channel>, StoreError>;

    /// Insert or replace `channel`, assigning an id first if it has none.
    async fn save(&self, channel: Channel) -> Result<Channel, StoreError>;

    /// Deleting an unknown id is not an error.
    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError>;

    async fn find_by_title(&self, title: &str) -> Result<Vec<Channel>, StoreError>;

    async fn find_by_quality(&self, quality: &str) -> Result<Vec<Channel>, StoreError>;

    /// Channels holding at least one comment posted strictly after `dt`.
    async fn find_by_comments_dt_after(&self, dt: NaiveDateTime)
        -> Result<Vec<Channel>, StoreError>;
}

pub(crate) fn assign_id(channel: &mut Channel) {
    if !channel.has_id() {
        channel.id = Uuid::new_v4().to_string();
    }
}

/// In-process store keeping channels in insertion order.
#[derive(Default)]
pub struct MemoryStore {
    channels: RwLock<Vec<Channel>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn filter<F>(&self, pred: F) -> Vec<Channel>
    where
        F: Fn(&Channel) -> bool + Send,
    {
        self.channels
            .read()
            .await
            .iter()
            .filter(|c| pred(c))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ChannelStore for MemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Channel>, StoreError> {
        Ok(self.channels.read().await.iter().find(|c| c.id == id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Channel>, StoreError> {
        Ok(self.channels.read().await.clone())
    }

    async fn save(&self, mut channel: Channel) -> Result<Channel, StoreError> {
        assign_id(&mut channel);
        let mut channels = self.channels.write().await;
        match channels.iter_mut().find(|c| c.id == channel.id) {
            Some(existing) => *existing = channel.clone(),
            None => channels.push(channel.clone()),
        }
        Ok(channel)
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        self.channels.write().await.retain(|c| c.id != id);
        Ok(())
    }

    async fn find_by_title(&self, title: &str) -> Result<Vec<Channel>, StoreError> {
        Ok(self.filter(|c| c.title == title).await)
    }

    async fn find_by_quality(&self, quality: &str) -> Result<Vec<Channel>, StoreError> {
        Ok(self.filter(|c| c.quality == quality).await)
    }

    async fn find_by_comments_dt_after(
        &self,
        dt: NaiveDateTime,
    ) -> Result<Vec<Channel>, StoreError> {
        Ok(self.filter(|c| c.comments.iter().any(|comment| comment.dt > dt)).await)
    }
}
