use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use remark_core::domain::comments::{Comment, CommentsPage, NewComment};
use remark_core::types::{CommentBody, PageRequest};
use remark_core::ErrorKind;
use remark_infra::notify::{CommentHub, Subscription};
use remark_infra::storage::{Storage, StorageError};

use super::ServiceError;

pub struct CommentService<S> {
    storage: Arc<S>,
    hub: CommentHub,
}

impl<S: Storage> CommentService<S> {
    pub fn new(storage: Arc<S>, hub: CommentHub) -> Self {
        Self { storage, hub }
    }

    /// Validates and stores a comment, then publishes it to the post's live
    /// subscribers.
    pub async fn create_comment(&self, input: NewComment) -> Result<Comment, ServiceError> {
        const OP: &str = "comments.create";

        CommentBody::try_from(input.content.as_str())
            .map_err(|source| ServiceError::InvalidInput { op: OP, source })?;

        let post = self
            .storage
            .get_post(&input.post_id)
            .await
            .map_err(ServiceError::storage(OP))?;
        if !post.comments_enabled {
            warn!(post_id = %post.id, "comment rejected: comments disabled");
            return Err(ServiceError::CommentsDisabled {
                op: OP,
                post_id: post.id,
            });
        }

        if let Some(parent_id) = input.parent_id.as_deref() {
            self.ensure_parent(OP, &input.post_id, parent_id).await?;
        }

        let comment = self
            .storage
            .create_comment(input)
            .await
            .map_err(ServiceError::storage(OP))?;

        self.hub.publish(&comment.post_id, &comment).await;
        info!(
            comment_id = %comment.id,
            post_id = %comment.post_id,
            parent_id = ?comment.parent_id,
            "comment created"
        );
        Ok(comment)
    }

    /// One page of root comments together with the post's root comment count.
    pub async fn get_comments(
        &self,
        post_id: &str,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<CommentsPage, ServiceError> {
        const OP: &str = "comments.list";

        let page = PageRequest::from_options(limit, offset);
        let comments = self
            .storage
            .get_comments_by_post(post_id, page)
            .await
            .map_err(ServiceError::storage(OP))?;
        let total = self
            .storage
            .count_comments_by_post(post_id)
            .await
            .map_err(ServiceError::storage(OP))?;
        debug!(post_id, count = comments.len(), total, "comments listed");
        Ok(CommentsPage { total, comments })
    }

    pub async fn get_comment(&self, id: &str) -> Result<Comment, ServiceError> {
        self.storage
            .get_comment(id)
            .await
            .map_err(ServiceError::storage("comments.get"))
    }

    pub async fn get_comment_replies(&self, parent_id: &str) -> Result<Vec<Comment>, ServiceError> {
        let replies = self
            .storage
            .get_comment_replies(parent_id)
            .await
            .map_err(ServiceError::storage("comments.replies"))?;
        debug!(parent_id, count = replies.len(), "replies listed");
        Ok(replies)
    }

    /// Live feed of comments created for `post_id` from now on.
    pub async fn subscribe(&self, cancel: &CancellationToken, post_id: &str) -> Subscription {
        self.hub.subscribe(cancel, post_id).await
    }

    async fn ensure_parent(
        &self,
        op: &'static str,
        post_id: &str,
        parent_id: &str,
    ) -> Result<(), ServiceError> {
        let parent_missing = || ServiceError::Storage {
            op,
            source: StorageError::ParentNotFound(parent_id.to_string()),
        };
        match self.storage.get_comment(parent_id).await {
            Ok(parent) if parent.post_id == post_id => Ok(()),
            Ok(_) => Err(parent_missing()),
            Err(err) if err.kind() == ErrorKind::NotFound => Err(parent_missing()),
            Err(err) => Err(ServiceError::storage(op)(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::timeout;

    use remark_core::domain::posts::{NewPost, Post};
    use remark_core::types::MAX_COMMENT_CHARS;
    use remark_infra::storage::MemoryStorage;

    use super::*;

    struct Fixture {
        comments: CommentService<MemoryStorage>,
        storage: Arc<MemoryStorage>,
        hub: CommentHub,
    }

    fn fixture() -> Fixture {
        let storage = Arc::new(MemoryStorage::new());
        let hub = CommentHub::default();
        Fixture {
            comments: CommentService::new(storage.clone(), hub.clone()),
            storage,
            hub,
        }
    }

    async fn post(storage: &MemoryStorage, comments_enabled: bool) -> Post {
        storage
            .create_post(NewPost {
                id: None,
                title: "T".to_string(),
                content: "C".to_string(),
                author: "A".to_string(),
                comments_enabled,
            })
            .await
            .unwrap()
    }

    fn input(post_id: &str, parent_id: Option<&str>, content: &str) -> NewComment {
        NewComment {
            post_id: post_id.to_string(),
            parent_id: parent_id.map(str::to_string),
            author: "U".to_string(),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn creates_root_comment_and_lists_it() {
        let fx = fixture();
        let post = post(&fx.storage, true).await;

        let comment = fx.comments.create_comment(input(&post.id, None, "hi")).await.unwrap();
        assert!(!comment.id.is_empty());
        assert_eq!(comment.parent_id, None);

        let page = fx.comments.get_comments(&post.id, Some(10), Some(0)).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.comments.len(), 1);
        assert_eq!(page.comments[0].content, "hi");
        assert_eq!(fx.comments.get_comment(&comment.id).await.unwrap(), comment);
    }

    #[tokio::test]
    async fn content_is_stored_as_given() {
        let fx = fixture();
        let post = post(&fx.storage, true).await;
        let comment = fx
            .comments
            .create_comment(input(&post.id, None, "  padded\n"))
            .await
            .unwrap();
        assert_eq!(comment.content, "  padded\n");
        assert_eq!(
            fx.comments.get_comment(&comment.id).await.unwrap().content,
            "  padded\n"
        );
    }

    #[tokio::test]
    async fn rejects_blank_and_oversized_content() {
        let fx = fixture();
        let post = post(&fx.storage, true).await;

        let err = fx.comments.create_comment(input(&post.id, None, "   ")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let long = "x".repeat(MAX_COMMENT_CHARS + 1);
        let err = fx.comments.create_comment(input(&post.id, None, &long)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        assert_eq!(fx.storage.count_comments_by_post(&post.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn disabled_post_rejects_and_stores_nothing() {
        let fx = fixture();
        let post = post(&fx.storage, false).await;

        let err = fx.comments.create_comment(input(&post.id, None, "hi")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CommentsDisabled);
        assert_eq!(fx.storage.count_comments_by_post(&post.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_post_is_not_found() {
        let fx = fixture();
        let err = fx.comments.create_comment(input("ghost", None, "hi")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn missing_parent_is_parent_not_found() {
        let fx = fixture();
        let post = post(&fx.storage, true).await;
        let err = fx
            .comments
            .create_comment(input(&post.id, Some("ghost"), "hi"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParentNotFound);
    }

    #[tokio::test]
    async fn parent_on_other_post_is_parent_not_found() {
        let fx = fixture();
        let first = post(&fx.storage, true).await;
        let second = post(&fx.storage, true).await;
        let root = fx.comments.create_comment(input(&first.id, None, "root")).await.unwrap();

        let err = fx
            .comments
            .create_comment(input(&second.id, Some(&root.id), "stray"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ParentNotFound);
        assert_eq!(fx.storage.count_comments_by_post(&second.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn replies_are_separate_from_roots() {
        let fx = fixture();
        let post = post(&fx.storage, true).await;
        let root = fx.comments.create_comment(input(&post.id, None, "root")).await.unwrap();
        let r1 = fx
            .comments
            .create_comment(input(&post.id, Some(&root.id), "r1"))
            .await
            .unwrap();
        let r2 = fx
            .comments
            .create_comment(input(&post.id, Some(&root.id), "r2"))
            .await
            .unwrap();

        let page = fx.comments.get_comments(&post.id, None, None).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.comments, vec![root.clone()]);
        assert_eq!(
            fx.comments.get_comment_replies(&root.id).await.unwrap(),
            vec![r1, r2]
        );
    }

    #[tokio::test]
    async fn created_comment_reaches_subscribers_of_its_post_only() {
        let fx = fixture();
        let watched = post(&fx.storage, true).await;
        let other = post(&fx.storage, true).await;
        let cancel = CancellationToken::new();
        let mut watched_sub = fx.comments.subscribe(&cancel, &watched.id).await;
        let mut other_sub = fx.comments.subscribe(&cancel, &other.id).await;

        let comment = fx
            .comments
            .create_comment(input(&watched.id, None, "live"))
            .await
            .unwrap();

        let received = timeout(Duration::from_millis(200), watched_sub.recv())
            .await
            .unwrap();
        assert_eq!(received, Some(comment));
        assert!(timeout(Duration::from_millis(50), other_sub.recv()).await.is_err());
    }

    #[tokio::test]
    async fn rejected_comment_is_not_published() {
        let fx = fixture();
        let post = post(&fx.storage, false).await;
        let cancel = CancellationToken::new();
        let mut sub = fx.hub.subscribe(&cancel, &post.id).await;

        assert!(fx.comments.create_comment(input(&post.id, None, "hi")).await.is_err());
        assert!(timeout(Duration::from_millis(50), sub.recv()).await.is_err());
    }
}
