use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("comment cannot be empty")]
    EmptyComment,
    #[error("comment exceeds {max} characters limit (got {len})")]
    CommentTooLong { max: usize, len: usize },
}

/// Failure categories shared by every layer, so callers can branch on the
/// cause no matter how much context was wrapped around it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    ParentNotFound,
    CommentsDisabled,
    InvalidInput,
    Internal,
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }
}
