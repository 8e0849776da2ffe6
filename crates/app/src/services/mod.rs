//! Business rules on top of storage and the comment hub.

pub mod comments;
pub mod error;
pub mod posts;

use std::sync::Arc;

use remark_infra::notify::CommentHub;
use remark_infra::storage::Storage;

pub use comments::CommentService;
pub use error::ServiceError;
pub use posts::PostService;

pub struct Services<S> {
    pub posts: PostService<S>,
    pub comments: CommentService<S>,
}

impl<S: Storage> Services<S> {
    pub fn new(storage: Arc<S>, hub: CommentHub) -> Self {
        Self {
            posts: PostService::new(storage.clone()),
            comments: CommentService::new(storage, hub),
        }
    }
}
