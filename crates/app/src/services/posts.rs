use std::sync::Arc;

use tracing::{debug, info};

use remark_core::domain::posts::{NewPost, Post};
use remark_core::types::PageRequest;
use remark_infra::storage::Storage;

use super::ServiceError;

pub struct PostService<S> {
    storage: Arc<S>,
}

impl<S: Storage> PostService<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    pub async fn create_post(&self, input: NewPost) -> Result<Post, ServiceError> {
        let post = self
            .storage
            .create_post(input)
            .await
            .map_err(ServiceError::storage("posts.create"))?;
        info!(post_id = %post.id, comments_enabled = post.comments_enabled, "post created");
        Ok(post)
    }

    pub async fn get_posts(
        &self,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Vec<Post>, ServiceError> {
        let page = PageRequest::from_options(limit, offset);
        let posts = self
            .storage
            .get_posts(page)
            .await
            .map_err(ServiceError::storage("posts.list"))?;
        debug!(limit = page.limit, offset = page.offset, count = posts.len(), "posts listed");
        Ok(posts)
    }

    pub async fn get_post(&self, id: &str) -> Result<Post, ServiceError> {
        self.storage
            .get_post(id)
            .await
            .map_err(ServiceError::storage("posts.get"))
    }

    /// Sets the comments flag. Asking for the state the post is already in
    /// returns it untouched without writing.
    pub async fn toggle_comments(&self, post_id: &str, enabled: bool) -> Result<Post, ServiceError> {
        const OP: &str = "posts.toggle_comments";

        let mut post = self
            .storage
            .get_post(post_id)
            .await
            .map_err(ServiceError::storage(OP))?;
        if post.comments_enabled == enabled {
            debug!(post_id, enabled, "comments flag unchanged");
            return Ok(post);
        }

        post.comments_enabled = enabled;
        self.storage
            .update_post(&post)
            .await
            .map_err(ServiceError::storage(OP))?;
        info!(post_id, enabled, "comments toggled");
        Ok(post)
    }
}
