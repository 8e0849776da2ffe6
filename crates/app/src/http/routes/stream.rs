use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};

use super::comments::CommentsApiError;
use super::normalize_id;
use crate::state::AppState;
use remark_core::domain::comments::Comment;

/// Live comments for one post as server-sent events named `comment`.
///
/// The subscription hangs off the server's shutdown token, so shutdown ends
/// every stream; a client disconnect drops the stream and with it the
/// subscription.
pub async fn stream_comments(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, CommentsApiError> {
    let post_id = normalize_id(&post_id).ok_or(CommentsApiError::InvalidPostId)?;
    state.services.posts.get_post(&post_id).await?;

    let subscription = state
        .services
        .comments
        .subscribe(&state.shutdown, &post_id)
        .await;
    tracing::debug!(post_id = %subscription.post_id(), "comment stream opened");

    let events = subscription.filter_map(|comment| async move { to_event(&comment) });
    Ok(Sse::new(events).keep_alive(KeepAlive::new().interval(state.config.sse_keepalive)))
}

fn to_event(comment: &Comment) -> Option<Result<Event, Infallible>> {
    match Event::default()
        .event("comment")
        .id(comment.id.as_str())
        .json_data(comment)
    {
        Ok(event) => Some(Ok(event)),
        Err(err) => {
            tracing::warn!(comment_id = %comment.id, error = %err, "comment event not encodable");
            None
        }
    }
}
