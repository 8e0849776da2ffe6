//! Post and comment persistence.
//!
//! [`Storage`] is the contract every backend honours; [`StorageBackend`] is
//! the concrete choice made once at startup.

pub mod memory;
pub mod postgres;

use std::future::Future;

use thiserror::Error;

use remark_core::domain::comments::{Comment, NewComment};
use remark_core::domain::posts::{NewPost, Post};
use remark_core::types::PageRequest;
use remark_core::ErrorKind;

pub use memory::MemoryStorage;
pub use postgres::PostgresStorage;

use crate::db::DbPool;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("parent comment not found: {0}")]
    ParentNotFound(String),
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
}

impl StorageError {
    pub fn post_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "post",
            id: id.into(),
        }
    }

    pub fn comment_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "comment",
            id: id.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::NotFound { .. } => ErrorKind::NotFound,
            StorageError::ParentNotFound(_) => ErrorKind::ParentNotFound,
            StorageError::Sqlx(_) => ErrorKind::Internal,
        }
    }
}

pub trait Storage: Send + Sync {
    fn create_post(&self, post: NewPost) -> impl Future<Output = Result<Post, StorageError>> + Send;

    /// Newest first.
    fn get_posts(
        &self,
        page: PageRequest,
    ) -> impl Future<Output = Result<Vec<Post>, StorageError>> + Send;

    fn get_post(&self, id: &str) -> impl Future<Output = Result<Post, StorageError>> + Send;

    /// Replaces title, content and the comments flag of an existing post.
    fn update_post(&self, post: &Post) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Fails with `NotFound` for an unknown post and `ParentNotFound` when the
    /// parent is missing or belongs to another post.
    fn create_comment(
        &self,
        comment: NewComment,
    ) -> impl Future<Output = Result<Comment, StorageError>> + Send;

    fn get_comment(&self, id: &str) -> impl Future<Output = Result<Comment, StorageError>> + Send;

    /// Root comments only, newest first. Unknown posts yield an empty page.
    fn get_comments_by_post(
        &self,
        post_id: &str,
        page: PageRequest,
    ) -> impl Future<Output = Result<Vec<Comment>, StorageError>> + Send;

    fn count_comments_by_post(
        &self,
        post_id: &str,
    ) -> impl Future<Output = Result<usize, StorageError>> + Send;

    /// Direct children, oldest first.
    fn get_comment_replies(
        &self,
        parent_id: &str,
    ) -> impl Future<Output = Result<Vec<Comment>, StorageError>> + Send;

    fn close(&self) -> impl Future<Output = ()> + Send;
}

pub enum StorageBackend {
    Memory(MemoryStorage),
    Postgres(PostgresStorage),
}

impl StorageBackend {
    pub fn name(&self) -> &'static str {
        match self {
            StorageBackend::Memory(_) => "memory",
            StorageBackend::Postgres(_) => "postgres",
        }
    }

    pub fn pool(&self) -> Option<&DbPool> {
        match self {
            StorageBackend::Memory(_) => None,
            StorageBackend::Postgres(storage) => Some(storage.pool()),
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $method:ident($($arg:expr),*)) => {
        match $self {
            StorageBackend::Memory(inner) => inner.$method($($arg),*).await,
            StorageBackend::Postgres(inner) => inner.$method($($arg),*).await,
        }
    };
}

impl Storage for StorageBackend {
    async fn create_post(&self, post: NewPost) -> Result<Post, StorageError> {
        dispatch!(self, create_post(post))
    }

    async fn get_posts(&self, page: PageRequest) -> Result<Vec<Post>, StorageError> {
        dispatch!(self, get_posts(page))
    }

    async fn get_post(&self, id: &str) -> Result<Post, StorageError> {
        dispatch!(self, get_post(id))
    }

    async fn update_post(&self, post: &Post) -> Result<(), StorageError> {
        dispatch!(self, update_post(post))
    }

    async fn create_comment(&self, comment: NewComment) -> Result<Comment, StorageError> {
        dispatch!(self, create_comment(comment))
    }

    async fn get_comment(&self, id: &str) -> Result<Comment, StorageError> {
        dispatch!(self, get_comment(id))
    }

    async fn get_comments_by_post(
        &self,
        post_id: &str,
        page: PageRequest,
    ) -> Result<Vec<Comment>, StorageError> {
        dispatch!(self, get_comments_by_post(post_id, page))
    }

    async fn count_comments_by_post(&self, post_id: &str) -> Result<usize, StorageError> {
        dispatch!(self, count_comments_by_post(post_id))
    }

    async fn get_comment_replies(&self, parent_id: &str) -> Result<Vec<Comment>, StorageError> {
        dispatch!(self, get_comment_replies(parent_id))
    }

    async fn close(&self) {
        dispatch!(self, close())
    }
}

#[cfg(test)]
mod tests {
    use super::StorageError;
    use remark_core::ErrorKind;

    #[test]
    fn kinds_follow_variants() {
        assert_eq!(StorageError::post_not_found("p1").kind(), ErrorKind::NotFound);
        assert_eq!(StorageError::comment_not_found("c1").kind(), ErrorKind::NotFound);
        assert_eq!(
            StorageError::ParentNotFound("c1".to_string()).kind(),
            ErrorKind::ParentNotFound
        );
        assert_eq!(
            StorageError::Sqlx(sqlx::Error::RowNotFound).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn not_found_message_names_entity() {
        assert_eq!(
            StorageError::post_not_found("p1").to_string(),
            "post not found: p1"
        );
    }
}
