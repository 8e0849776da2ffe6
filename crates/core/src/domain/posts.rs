use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    pub comments_enabled: bool,
    pub created_at: DateTime<Utc>,
}

/// Post fields supplied by a caller. Storage assigns `id` when it is absent
/// and always stamps the creation time.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPost {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    pub content: String,
    pub author: String,
    pub comments_enabled: bool,
}

impl NewPost {
    pub fn into_post(self, id: String, created_at: DateTime<Utc>) -> Post {
        Post {
            id,
            title: self.title,
            content: self.content,
            author: self.author,
            comments_enabled: self.comments_enabled,
            created_at,
        }
    }
}
