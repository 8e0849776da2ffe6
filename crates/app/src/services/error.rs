use thiserror::Error;

use remark_core::{CoreError, ErrorKind};
use remark_infra::storage::StorageError;

/// Service failures. Each variant names the operation that failed and keeps
/// the underlying error as its source, so [`ServiceError::kind`] still tells
/// callers what went wrong.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{op}: invalid input: {source}")]
    InvalidInput {
        op: &'static str,
        #[source]
        source: CoreError,
    },
    #[error("{op}: comments are disabled for post {post_id}")]
    CommentsDisabled { op: &'static str, post_id: String },
    #[error("{op}: {source}")]
    Storage {
        op: &'static str,
        #[source]
        source: StorageError,
    },
}

impl ServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::InvalidInput { source, .. } => source.kind(),
            ServiceError::CommentsDisabled { .. } => ErrorKind::CommentsDisabled,
            ServiceError::Storage { source, .. } => source.kind(),
        }
    }

    pub(crate) fn storage(op: &'static str) -> impl FnOnce(StorageError) -> Self {
        move |source| ServiceError::Storage { op, source }
    }
}
