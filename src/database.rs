use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::mysql::{MySqlArguments, MySqlPoolOptions, MySqlRow};
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{MySql, Pool, Row};

use crate::cmp::channels::{Channel, Comment};
use crate::cmp::store::{assign_id, ChannelStore, StoreError};

const COLUMNS: &str = "`id`, `title`, `quality`, `url`, `cover`, `comments`";

/// Open the pool and bring the schema up to date.
pub async fn init_database(url: &str, max_connections: u32) -> Result<Pool<MySql>, StoreError> {
    let pool = MySqlPoolOptions::new()
        .max_connections(max_connections)
        .connect(url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    Ok(pool)
}

/// Channels stored one row each, with the comments kept as a JSON document.
pub struct MySqlStore {
    pool: Pool<MySql>,
}

impl MySqlStore {
    pub fn new(pool: Pool<MySql>) -> Self {
        Self { pool }
    }

    async fn fetch(&self, query: Query<'_, MySql, MySqlArguments>) -> Result<Vec<Channel>, StoreError> {
        query
            .fetch_all(&self.pool)
            .await?
            .iter()
            .map(channel_from_row)
            .collect()
    }
}

fn channel_from_row(row: &MySqlRow) -> Result<Channel, StoreError> {
    let comments = row.try_get::<Json<Vec<Comment>>, _>("comments")?;
    Ok(Channel {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        quality: row.try_get("quality")?,
        url: row.try_get("url")?,
        cover: row.try_get("cover")?,
        comments: comments.0,
    })
}

#[async_trait]
impl ChannelStore for MySqlStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Channel>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM `channels` WHERE `id`=?");
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(channel_from_row).transpose()
    }

    async fn find_all(&self) -> Result<Vec<Channel>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM `channels`");
        self.fetch(sqlx::query(&sql)).await
    }

    async fn save(&self, mut channel: Channel) -> Result<Channel, StoreError> {
        assign_id(&mut channel);
        let comments = serde_json::to_string(&channel.comments)?;
        sqlx::query(
            "INSERT INTO `channels` (`id`, `title`, `quality`, `url`, `cover`, `comments`) \
             VALUES (?, ?, ?, ?, ?, CAST(? AS JSON)) \
             ON DUPLICATE KEY UPDATE `title`=VALUES(`title`), `quality`=VALUES(`quality`), \
             `url`=VALUES(`url`), `cover`=VALUES(`cover`), `comments`=VALUES(`comments`);",
        )
        .bind(&channel.id)
        .bind(&channel.title)
        .bind(&channel.quality)
        .bind(&channel.url)
        .bind(&channel.cover)
        .bind(comments)
        .execute(&self.pool)
        .await?;

        Ok(channel)
    }

    async fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM `channels` WHERE `id`=?;")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_by_title(&self, title: &str) -> Result<Vec<Channel>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM `channels` WHERE `title`=?");
        self.fetch(sqlx::query(&sql).bind(title)).await
    }

    async fn find_by_quality(&self, quality: &str) -> Result<Vec<Channel>, StoreError> {
        let sql = format!("SELECT {COLUMNS} FROM `channels` WHERE `quality`=?");
        self.fetch(sqlx::query(&sql).bind(quality)).await
    }

    async fn find_by_comments_dt_after(
        &self,
        dt: NaiveDateTime,
    ) -> Result<Vec<Channel>, StoreError> {
        let sql = format!(
            "SELECT {COLUMNS} FROM `channels` c WHERE EXISTS (\
             SELECT 1 FROM JSON_TABLE(c.`comments`, '$[*]' COLUMNS (`dt` DATETIME(6) PATH '$.dt')) jt \
             WHERE jt.`dt` > ?)"
        );
        self.fetch(sqlx::query(&sql).bind(dt)).await
    }
}
