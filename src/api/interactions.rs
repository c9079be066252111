//! Likes, favorites and comments on a post.

use serde_json::json;

use super::posts::post_path;
use super::types::{CommentItem, DeletedAck, InteractionSummary, PagedComments};
use super::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, paged};
use crate::net::error::ApiError;
use crate::net::gateway::{ApiRequest, Gateway};

fn like_path(post_id: i64) -> String {
    format!("{}/like", post_path(post_id))
}

fn favorite_path(post_id: i64) -> String {
    format!("{}/favorite", post_path(post_id))
}

fn comments_path(post_id: i64) -> String {
    format!("{}/comments", post_path(post_id))
}

/// Counts plus the caller's own like/favorite flags.
///
/// # Errors
///
/// Returns the server or transport error.
pub async fn get_post_interactions(gateway: &Gateway, post_id: i64) -> Result<InteractionSummary, ApiError> {
    let path = format!("{}/interactions", post_path(post_id));
    gateway.send_json(&ApiRequest::get(path)).await
}

/// # Errors
///
/// Returns the server or transport error.
pub async fn like_post(gateway: &Gateway, post_id: i64) -> Result<InteractionSummary, ApiError> {
    gateway.send_json(&ApiRequest::put(like_path(post_id))).await
}

/// # Errors
///
/// Returns the server or transport error.
pub async fn unlike_post(gateway: &Gateway, post_id: i64) -> Result<InteractionSummary, ApiError> {
    gateway.send_json(&ApiRequest::delete(like_path(post_id))).await
}

/// # Errors
///
/// Returns the server or transport error.
pub async fn favorite_post(gateway: &Gateway, post_id: i64) -> Result<InteractionSummary, ApiError> {
    gateway.send_json(&ApiRequest::put(favorite_path(post_id))).await
}

/// # Errors
///
/// Returns the server or transport error.
pub async fn unfavorite_post(gateway: &Gateway, post_id: i64) -> Result<InteractionSummary, ApiError> {
    gateway.send_json(&ApiRequest::delete(favorite_path(post_id))).await
}

/// Public, paged comment listing.
///
/// # Errors
///
/// Returns the server or transport error.
pub async fn list_comments(
    gateway: &Gateway,
    post_id: i64,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<PagedComments, ApiError> {
    let path = paged(
        &comments_path(post_id),
        page.unwrap_or(DEFAULT_PAGE),
        page_size.unwrap_or(DEFAULT_PAGE_SIZE),
    );
    gateway.send_json(&ApiRequest::get(path).skip_auth()).await
}

/// # Errors
///
/// Returns the server or transport error.
pub async fn create_comment(gateway: &Gateway, post_id: i64, content: &str) -> Result<CommentItem, ApiError> {
    let request = ApiRequest::post(comments_path(post_id)).json(json!({ "content": content }));
    gateway.send_json(&request).await
}

/// # Errors
///
/// Returns `FORBIDDEN` when the caller neither wrote the comment nor is an admin.
pub async fn delete_comment(gateway: &Gateway, comment_id: i64) -> Result<DeletedAck, ApiError> {
    gateway
        .send_json(&ApiRequest::delete(format!("/api/comments/{comment_id}")))
        .await
}

#[cfg(test)]
#[path = "interactions_test.rs"]
mod tests;
