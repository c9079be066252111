//! Post endpoints.

use serde_json::json;

use super::types::{DeletedAck, PagedPosts, Post};
use super::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, paged};
use crate::net::error::ApiError;
use crate::net::gateway::{ApiRequest, Gateway};

pub const POSTS_PATH: &str = "/api/posts";
pub const MY_POSTS_PATH: &str = "/api/posts/mine";
pub const MY_FAVORITES_PATH: &str = "/api/me/favorites";

/// Title and Markdown body sent on create and update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub content_markdown: String,
}

impl PostDraft {
    #[must_use]
    pub fn new(title: impl Into<String>, content_markdown: impl Into<String>) -> Self {
        Self { title: title.into(), content_markdown: content_markdown.into() }
    }

    fn to_body(&self) -> serde_json::Value {
        json!({ "title": self.title, "contentMarkdown": self.content_markdown })
    }
}

#[must_use]
pub fn post_path(id: i64) -> String {
    format!("{POSTS_PATH}/{id}")
}

/// Public, newest-first listing.
///
/// # Errors
///
/// Returns the server or transport error.
pub async fn list_posts(gateway: &Gateway, page: Option<u32>, page_size: Option<u32>) -> Result<PagedPosts, ApiError> {
    let path = paged(POSTS_PATH, page.unwrap_or(DEFAULT_PAGE), page_size.unwrap_or(DEFAULT_PAGE_SIZE));
    gateway.send_json(&ApiRequest::get(path).skip_auth()).await
}

/// # Errors
///
/// Returns `POST_NOT_FOUND` (404) for unknown or deleted posts.
pub async fn get_post(gateway: &Gateway, id: i64) -> Result<Post, ApiError> {
    gateway.send_json(&ApiRequest::get(post_path(id)).skip_auth()).await
}

/// # Errors
///
/// Returns the server or transport error.
pub async fn create_post(gateway: &Gateway, draft: &PostDraft) -> Result<Post, ApiError> {
    gateway
        .send_json(&ApiRequest::post(POSTS_PATH).json(draft.to_body()))
        .await
}

/// # Errors
///
/// Returns `FORBIDDEN` when the caller is neither author nor admin.
pub async fn update_post(gateway: &Gateway, id: i64, draft: &PostDraft) -> Result<Post, ApiError> {
    gateway
        .send_json(&ApiRequest::put(post_path(id)).json(draft.to_body()))
        .await
}

/// # Errors
///
/// Returns `FORBIDDEN` when the caller is neither author nor admin.
pub async fn delete_post(gateway: &Gateway, id: i64) -> Result<DeletedAck, ApiError> {
    gateway.send_json(&ApiRequest::delete(post_path(id))).await
}

/// Posts written by the signed-in user.
///
/// # Errors
///
/// Returns the server or transport error.
pub async fn list_my_posts(gateway: &Gateway, page: Option<u32>, page_size: Option<u32>) -> Result<PagedPosts, ApiError> {
    let path = paged(MY_POSTS_PATH, page.unwrap_or(DEFAULT_PAGE), page_size.unwrap_or(DEFAULT_PAGE_SIZE));
    gateway.send_json(&ApiRequest::get(path)).await
}

/// Posts the signed-in user favorited; items carry `favoritedAt`.
///
/// # Errors
///
/// Returns the server or transport error.
pub async fn list_my_favorites(
    gateway: &Gateway,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<PagedPosts, ApiError> {
    let path = paged(MY_FAVORITES_PATH, page.unwrap_or(DEFAULT_PAGE), page_size.unwrap_or(DEFAULT_PAGE_SIZE));
    gateway.send_json(&ApiRequest::get(path)).await
}

#[cfg(test)]
#[path = "posts_test.rs"]
mod tests;
