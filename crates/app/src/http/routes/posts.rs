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
use remark_core::domain::posts::{NewPost, Post};

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(default = "enabled_by_default")]
    pub comments_enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct ToggleCommentsRequest {
    pub enabled: bool,
}

#[derive(Debug, Error)]
pub enum PostsApiError {
    #[error("post id is invalid")]
    InvalidPostId,
    #[error(transparent)]
    Body(#[from] JsonRejection),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<Vec<Post>>, PostsApiError> {
    let (limit, offset) = params.clamped(state.config.max_page_limit);
    let posts = state.services.posts.get_posts(limit, offset).await?;
    Ok(Json(posts))
}

pub async fn create_post(
    State(state): State<AppState>,
    body: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Post>), PostsApiError> {
    let Json(request) = body?;
    let input = NewPost {
        id: None,
        title: request.title,
        content: request.content,
        author: request.author,
        comments_enabled: request.comments_enabled,
    };
    let post = state.services.posts.create_post(input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Post>, PostsApiError> {
    let id = normalize_id(&id).ok_or(PostsApiError::InvalidPostId)?;
    let post = state.services.posts.get_post(&id).await?;
    Ok(Json(post))
}

pub async fn put_comments_enabled(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ToggleCommentsRequest>, JsonRejection>,
) -> Result<Json<Post>, PostsApiError> {
    let id = normalize_id(&id).ok_or(PostsApiError::InvalidPostId)?;
    let Json(request) = body?;
    let post = state
        .services
        .posts
        .toggle_comments(&id, request.enabled)
        .await?;
    Ok(Json(post))
}

impl IntoResponse for PostsApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            PostsApiError::InvalidPostId => StatusCode::BAD_REQUEST,
            PostsApiError::Body(rejection) => rejection_status(rejection),
            PostsApiError::Service(err) => status_for(err.kind()),
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "posts request failed");
        }
        let body = Json(ErrorBody {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}
