pub mod comments;
pub mod health;
pub mod posts;
pub mod stream;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use remark_core::ErrorKind;

const MAX_ID_LEN: usize = 128;

#[derive(Debug, Serialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl PageParams {
    /// Caps the requested limit; an omitted limit keeps the service default.
    pub(crate) fn clamped(&self, max_limit: usize) -> (Option<usize>, Option<usize>) {
        (self.limit.map(|limit| limit.min(max_limit)), self.offset)
    }
}

pub(crate) fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound | ErrorKind::ParentNotFound => StatusCode::NOT_FOUND,
        ErrorKind::CommentsDisabled => StatusCode::FORBIDDEN,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// A body sent without a JSON content type is 415; anything else that fails
/// to parse is 400.
pub(crate) fn rejection_status(rejection: &JsonRejection) -> StatusCode {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        _ => StatusCode::BAD_REQUEST,
    }
}

/// Trims a path or body id; `None` when empty, too long or containing
/// whitespace.
pub(crate) fn normalize_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.len() > MAX_ID_LEN {
        return None;
    }
    if trimmed.chars().any(char::is_whitespace) {
        return None;
    }
    Some(trimmed.to_string())
}
