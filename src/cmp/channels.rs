use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// A user comment. Comments have no identity of their own, they are addressed
/// through their parent channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub star: i32,
    pub dt: NaiveDateTime,
}

/// A comment as clients send it, alone or inside a channel body. `dt` is
/// stamped on arrival when missing.
#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub star: i32,
    pub dt: Option<NaiveDateTime>,
}

impl NewComment {
    pub fn posted_at(self, now: NaiveDateTime) -> Comment {
        Comment {
            content: self.content,
            star: self.star,
            dt: self.dt.unwrap_or(now),
        }
    }
}

impl From<Comment> for NewComment {
    fn from(comment: Comment) -> Self {
        Self {
            content: comment.content,
            star: comment.star,
            dt: Some(comment.dt),
        }
    }
}

fn stamp(comments: Vec<NewComment>, now: NaiveDateTime) -> Vec<Comment> {
    comments.into_iter().map(|c| c.posted_at(now)).collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Empty until the store assigns one.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub quality: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub cover: String,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Body of `POST /channel`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewChannel {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub quality: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub cover: String,
    #[serde(default)]
    pub comments: Vec<NewComment>,
}

impl NewChannel {
    pub fn posted_at(self, now: NaiveDateTime) -> Channel {
        Channel {
            id: self.id,
            title: self.title,
            quality: self.quality,
            url: self.url,
            cover: self.cover,
            comments: stamp(self.comments, now),
        }
    }
}

impl From<Channel> for NewChannel {
    fn from(channel: Channel) -> Self {
        Self {
            id: channel.id,
            title: channel.title,
            quality: channel.quality,
            url: channel.url,
            cover: channel.cover,
            comments: channel.comments.into_iter().map(NewComment::from).collect(),
        }
    }
}

/// Body of `PUT /channel`. Absent (or empty) fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChannelUpdate {
    pub id: String,
    pub title: Option<String>,
    pub quality: Option<String>,
    pub url: Option<String>,
    pub cover: Option<String>,
    /// `None` when the field is missing, `Some(None)` when it is `null`.
    #[serde(default, deserialize_with = "present")]
    pub comments: Option<Option<Vec<NewComment>>>,
}

fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::deserialize(deserializer).map(Some)
}

fn overwrite(field: &mut String, incoming: Option<String>) {
    if let Some(value) = incoming.filter(|v| !v.is_empty()) {
        *field = value;
    }
}

impl Channel {
    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn add_comment(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    /// Field-wise merge of a partial update.
    ///
    /// Non-empty incoming comments are appended to the stored ones, while an
    /// explicit `null` or `[]` clears them. That asymmetry is long-standing API
    /// behavior and stays until product owners decide otherwise. Leaving the
    /// field out keeps the stored comments. Undated comments get `now`.
    pub fn merge(&mut self, update: ChannelUpdate, now: NaiveDateTime) {
        overwrite(&mut self.title, update.title);
        overwrite(&mut self.quality, update.quality);
        overwrite(&mut self.url, update.url);
        overwrite(&mut self.cover, update.cover);
        match update.comments {
            None => {}
            Some(Some(comments)) if !comments.is_empty() => {
                self.comments.extend(stamp(comments, now))
            }
            Some(_) => self.comments.clear(),
        }
    }

    /// Up to three comments ordered by descending star rating, ties kept in
    /// posting order. Works on a copy; the channel's own order is untouched,
    /// unlike sorting the stored list in place.
    pub fn hot_comments(&self) -> Vec<Comment> {
        let mut ranked = self.comments.clone();
        ranked.sort_by(|a, b| b.star.cmp(&a.star));
        ranked.truncate(3);
        ranked
    }
}
