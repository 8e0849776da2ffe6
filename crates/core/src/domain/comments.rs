use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub post_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewComment {
    pub post_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub author: String,
    pub content: String,
}

impl NewComment {
    pub fn into_comment(self, id: String, created_at: DateTime<Utc>) -> Comment {
        Comment {
            id,
            post_id: self.post_id,
            parent_id: self.parent_id,
            author: self.author,
            content: self.content,
            created_at,
        }
    }
}

/// One page of root comments plus the total number of root comments on the
/// post.
#[derive(Debug, Clone, Serialize)]
pub struct CommentsPage {
    pub total: usize,
    pub comments: Vec<Comment>,
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::{Comment, NewComment};

    #[test]
    fn root_comment_omits_parent_in_json() {
        let comment = NewComment {
            post_id: "p1".to_string(),
            parent_id: None,
            author: "u".to_string(),
            content: "hi".to_string(),
        }
        .into_comment("c1".to_string(), Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(comment.parent_id, None);
        let json = serde_json::to_value(&comment).unwrap();
        assert!(json.get("parent_id").is_none());
        assert_eq!(json["post_id"], "p1");
    }

    #[test]
    fn reply_keeps_parent() {
        let json = r#"{"post_id":"p1","parent_id":"c1","author":"u","content":"re"}"#;
        let input: NewComment = serde_json::from_str(json).unwrap();
        let reply: Comment = input.into_comment("c2".to_string(), Utc::now());
        assert_eq!(reply.parent_id.as_deref(), Some("c1"));
    }
}
