use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use thiserror::Error;

use super::{normalize_id, rejection_status, status_for, ErrorBody, PageParams};
use crate::services::ServiceError;
use crate::state::AppState;
use remark_core::domain::comments::{Comment, CommentsPage, NewComment};

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub post_id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub author: String,
    pub content: String,
}

#[derive(Debug, Error)]
pub enum CommentsApiError {
    #[error("post_id is invalid")]
    InvalidPostId,
    #[error("comment id is invalid")]
    InvalidCommentId,
    #[error(transparent)]
    Body(#[from] JsonRejection),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
    Query(params): Query<PageParams>,
) -> Result<Json<CommentsPage>, CommentsApiError> {
    let post_id = normalize_id(&post_id).ok_or(CommentsApiError::InvalidPostId)?;
    let (limit, offset) = params.clamped(state.config.max_page_limit);
    let page = state
        .services
        .comments
        .get_comments(&post_id, limit, offset)
        .await?;
    Ok(Json(page))
}

pub async fn create_comment(
    State(state): State<AppState>,
    body: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Comment>), CommentsApiError> {
    let Json(request) = body?;
    let input = parse_new_comment(request)?;
    let comment = state.services.comments.create_comment(input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Comment>, CommentsApiError> {
    let id = normalize_id(&id).ok_or(CommentsApiError::InvalidCommentId)?;
    let comment = state.services.comments.get_comment(&id).await?;
    Ok(Json(comment))
}

pub async fn get_replies(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Comment>>, CommentsApiError> {
    let id = normalize_id(&id).ok_or(CommentsApiError::InvalidCommentId)?;
    let replies = state.services.comments.get_comment_replies(&id).await?;
    Ok(Json(replies))
}

// Content rules live in the service; this only shapes the ids.
fn parse_new_comment(request: CreateCommentRequest) -> Result<NewComment, CommentsApiError> {
    let post_id = normalize_id(&request.post_id).ok_or(CommentsApiError::InvalidPostId)?;
    let parent_id = match request.parent_id.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(normalize_id(raw).ok_or(CommentsApiError::InvalidCommentId)?),
    };
    Ok(NewComment {
        post_id,
        parent_id,
        author: request.author,
        content: request.content,
    })
}

impl IntoResponse for CommentsApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            CommentsApiError::InvalidPostId | CommentsApiError::InvalidCommentId => {
                StatusCode::BAD_REQUEST
            }
            CommentsApiError::Body(rejection) => rejection_status(rejection),
            CommentsApiError::Service(err) => status_for(err.kind()),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "comments request failed");
        }
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_new_comment, CommentsApiError, CreateCommentRequest};

    fn request(post_id: &str, parent_id: Option<&str>, author: &str) -> CreateCommentRequest {
        CreateCommentRequest {
            post_id: post_id.to_string(),
            parent_id: parent_id.map(str::to_string),
            author: author.to_string(),
            content: "hi".to_string(),
        }
    }

    #[test]
    fn blank_parent_means_root() {
        let input = parse_new_comment(request(" p1 ", Some("  "), "u")).unwrap();
        assert_eq!(input.post_id, "p1");
        assert_eq!(input.parent_id, None);
    }

    #[test]
    fn parent_is_trimmed() {
        let input = parse_new_comment(request("p1", Some(" c1 "), "u")).unwrap();
        assert_eq!(input.parent_id.as_deref(), Some("c1"));
    }

    #[test]
    fn author_passes_through_unchanged() {
        let input = parse_new_comment(request("p1", None, "")).unwrap();
        assert_eq!(input.author, "");
        let input = parse_new_comment(request("p1", None, " u ")).unwrap();
        assert_eq!(input.author, " u ");
    }

    #[test]
    fn rejects_bad_ids() {
        assert!(matches!(
            parse_new_comment(request("", None, "u")),
            Err(CommentsApiError::InvalidPostId)
        ));
        assert!(matches!(
            parse_new_comment(request("p1", Some("a b"), "u")),
            Err(CommentsApiError::InvalidCommentId)
        ));
    }
}
