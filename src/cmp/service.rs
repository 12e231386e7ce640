use std::sync::Arc;

use log::debug;

use super::{
    channels::{Channel, ChannelUpdate, Comment, NewChannel, NewComment},
    clock::{start_of_day, Clock, SystemClock},
    store::{ChannelStore, StoreError},
};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Channel {0} not found")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Channel business logic on top of a [ChannelStore].
pub struct ChannelService {
    store: Arc<dyn ChannelStore>,
    clock: Arc<dyn Clock>,
}

impl ChannelService {
    pub fn new(store: Arc<dyn ChannelStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn ChannelStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    async fn load(&self, id: &str) -> Result<Channel, ServiceError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(id.to_string()))
    }

    pub async fn get_channel(&self, id: &str) -> Result<Channel, ServiceError> {
        self.load(id).await
    }

    pub async fn get_all_channels(&self) -> Result<Vec<Channel>, ServiceError> {
        Ok(self.store.find_all().await?)
    }

    /// Reports success whether or not the channel existed.
    pub async fn delete_channel(&self, id: &str) -> Result<bool, ServiceError> {
        self.store.delete_by_id(id).await?;
        Ok(true)
    }

    /// Merge `update` into the stored channel with the same id. Nothing is
    /// written when no such channel exists.
    pub async fn update_channel(&self, update: ChannelUpdate) -> Result<Channel, ServiceError> {
        let mut saved = self.load(&update.id).await?;
        saved.merge(update, self.clock.now());
        Ok(self.store.save(saved).await?)
    }

    /// Comments without a `dt` are stamped with the current time.
    pub async fn create_channel(&self, channel: NewChannel) -> Result<Channel, ServiceError> {
        Ok(self.store.save(channel.posted_at(self.clock.now())).await?)
    }

    pub async fn search_by_title(&self, title: &str) -> Result<Vec<Channel>, ServiceError> {
        Ok(self.store.find_by_title(title).await?)
    }

    pub async fn search_by_quality(&self, quality: &str) -> Result<Vec<Channel>, ServiceError> {
        Ok(self.store.find_by_quality(quality).await?)
    }

    /// Channels commented on since local midnight.
    pub async fn search_latest_by_comments_channel(&self) -> Result<Vec<Channel>, ServiceError> {
        let today = start_of_day(self.clock.now());
        debug!("Looking for channels commented after {today}");
        Ok(self.store.find_by_comments_dt_after(today).await?)
    }

    pub async fn add_comment(
        &self,
        channel_id: &str,
        comment: NewComment,
    ) -> Result<Channel, ServiceError> {
        let mut saved = self.load(channel_id).await?;
        saved.add_comment(comment.posted_at(self.clock.now()));
        Ok(self.store.save(saved).await?)
    }

    /// The three best rated comments of a channel. The stored comment order
    /// is left as is.
    pub async fn hot_comments(&self, channel_id: &str) -> Result<Vec<Comment>, ServiceError> {
        let saved = self.load(channel_id).await?;
        debug!("Channel {channel_id} is {saved:?}");
        Ok(saved.hot_comments())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmp::{clock::FixedClock, store::MemoryStore};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn service() -> ChannelService {
        ChannelService::with_clock(
            Arc::new(MemoryStore::new()),
            Arc::new(FixedClock(at(16, 10, 0))),
        )
    }

    fn comment(content: &str, star: i32, dt: NaiveDateTime) -> Comment {
        Comment {
            content: content.to_string(),
            star,
            dt,
        }
    }

    fn news() -> Channel {
        Channel {
            title: "News".to_string(),
            quality: "1080p".to_string(),
            url: "http://example.com/news.m3u8".to_string(),
            cover: "http://example.com/news.png".to_string(),
            ..Default::default()
        }
    }

    #[rocket::async_test]
    async fn create_then_get() {
        let service = service();
        let created = service.create_channel(news().into()).await.unwrap();
        let fetched = service.get_channel(&created.id).await.unwrap();
        assert_eq!(created, fetched);
        assert_eq!(fetched.title, "News");
    }

    #[rocket::async_test]
    async fn delete_always_succeeds() {
        let service = service();
        let created = service.create_channel(news().into()).await.unwrap();
        assert!(service.delete_channel(&created.id).await.unwrap());
        assert!(service.delete_channel(&created.id).await.unwrap());
        assert!(matches!(
            service.get_channel(&created.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[rocket::async_test]
    async fn title_only_update_keeps_the_rest() {
        let service = service();
        let mut channel = news();
        channel.comments.push(comment("nice", 4, at(15, 9, 0)));
        let created = service.create_channel(channel.into()).await.unwrap();

        let updated = service
            .update_channel(ChannelUpdate {
                id: created.id.clone(),
                title: Some("Sports".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.title, "Sports");
        assert_eq!(updated.quality, created.quality);
        assert_eq!(updated.url, created.url);
        assert_eq!(updated.cover, created.cover);
        assert_eq!(updated.comments, created.comments);
    }

    #[rocket::async_test]
    async fn update_comments_append_or_clear() {
        let service = service();
        let mut channel = news();
        channel.comments.push(comment("nice", 4, at(15, 9, 0)));
        let created = service.create_channel(channel.into()).await.unwrap();

        let updated = service
            .update_channel(ChannelUpdate {
                id: created.id.clone(),
                comments: Some(Some(vec![comment("more", 2, at(16, 9, 0)).into()])),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(updated.comments.len(), 2);
        assert_eq!(updated.comments[0].content, "nice");

        let cleared = service
            .update_channel(ChannelUpdate {
                id: created.id.clone(),
                comments: Some(Some(Vec::new())),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(cleared.comments.is_empty());
        assert_eq!(service.get_channel(&created.id).await.unwrap(), cleared);
    }

    #[rocket::async_test]
    async fn update_unknown_channel_writes_nothing() {
        let service = service();
        let result = service
            .update_channel(ChannelUpdate {
                id: "ghost".to_string(),
                title: Some("Ghost".to_string()),
                ..Default::default()
            })
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound(id)) if id == "ghost"));
        assert!(service.get_all_channels().await.unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn add_comment_appends_and_stamps() {
        let service = service();
        let created = service.create_channel(news().into()).await.unwrap();
        let body = NewComment {
            content: "hello".to_string(),
            star: 5,
            dt: None,
        };
        let updated = service.add_comment(&created.id, body).await.unwrap();
        assert_eq!(updated.comments, vec![comment("hello", 5, at(16, 10, 0))]);
    }

    #[rocket::async_test]
    async fn add_comment_to_unknown_channel() {
        let service = service();
        let body = NewComment {
            content: "hello".to_string(),
            star: 5,
            dt: None,
        };
        assert!(matches!(
            service.add_comment("ghost", body).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(service.get_all_channels().await.unwrap().is_empty());
    }

    #[rocket::async_test]
    async fn hot_comments_rank_without_reordering_storage() {
        let service = service();
        let mut channel = news();
        for (i, star) in [2, 5, 3, 5, 1].into_iter().enumerate() {
            channel
                .comments
                .push(comment(&format!("c{i}"), star, at(15, 8, i as u32)));
        }
        let created = service.create_channel(channel.into()).await.unwrap();

        let hot = service.hot_comments(&created.id).await.unwrap();
        let names: Vec<_> = hot.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(names, vec!["c1", "c3", "c2"]);

        let stored = service.get_channel(&created.id).await.unwrap();
        assert_eq!(stored.comments, created.comments);
    }

    #[rocket::async_test]
    async fn hot_comments_of_small_and_empty_channels() {
        let service = service();
        let empty = service.create_channel(news().into()).await.unwrap();
        assert!(service.hot_comments(&empty.id).await.unwrap().is_empty());

        let mut channel = news();
        channel.comments.push(comment("low", 1, at(15, 8, 0)));
        channel.comments.push(comment("high", 4, at(15, 9, 0)));
        let small = service.create_channel(channel.into()).await.unwrap();
        let hot = service.hot_comments(&small.id).await.unwrap();
        assert_eq!(hot.len(), 2);
        assert_eq!(hot[0].content, "high");
    }

    #[rocket::async_test]
    async fn hot_comments_of_exactly_three() {
        let service = service();
        let mut channel = news();
        for (content, star) in [("ok", 3), ("bad", 1), ("great", 5)] {
            channel.comments.push(comment(content, star, at(15, 8, 0)));
        }
        let created = service.create_channel(channel.into()).await.unwrap();
        let hot = service.hot_comments(&created.id).await.unwrap();
        let names: Vec<_> = hot.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(names, vec!["great", "ok", "bad"]);
    }

    #[rocket::async_test]
    async fn undated_comments_are_stamped_on_create_and_update() {
        let service = service();
        let body = serde_json::from_str(r#"{"title":"News","comments":[{"content":"a","star":1}]}"#)
            .unwrap();
        let created = service.create_channel(body).await.unwrap();
        assert_eq!(created.comments[0].dt, at(16, 10, 0));

        let update = serde_json::from_str(&format!(
            r#"{{"id":"{}","comments":[{{"content":"b","star":2}}]}}"#,
            created.id
        ))
        .unwrap();
        let updated = service.update_channel(update).await.unwrap();
        assert_eq!(updated.comments[1].dt, at(16, 10, 0));
    }

    #[rocket::async_test]
    async fn search_by_title_is_exact() {
        let service = service();
        let mut other = news();
        other.title = "News 24".to_string();
        service.create_channel(news().into()).await.unwrap();
        service.create_channel(other.into()).await.unwrap();

        let found = service.search_by_title("News").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "News");
        assert_eq!(service.search_by_quality("1080p").await.unwrap().len(), 2);
    }

    #[rocket::async_test]
    async fn hot_channels_are_commented_today() {
        let store = Arc::new(MemoryStore::new());
        let service = ChannelService::with_clock(store, Arc::new(FixedClock(at(16, 23, 59))));

        let mut today = news();
        today.title = "Today".to_string();
        today.comments.push(comment("late", 3, at(16, 23, 59)));
        let mut yesterday = news();
        yesterday.title = "Yesterday".to_string();
        yesterday.comments.push(comment("late", 3, at(15, 23, 59)));
        service.create_channel(today.into()).await.unwrap();
        service.create_channel(yesterday.into()).await.unwrap();

        let hot = service.search_latest_by_comments_channel().await.unwrap();
        let titles: Vec<_> = hot.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Today"]);
    }
}
