//! Full-text post search.

use super::types::PagedPosts;
use super::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE, paged};
use crate::net::error::ApiError;
use crate::net::gateway::{ApiRequest, Gateway};

pub const SEARCH_PATH: &str = "/api/search";

/// Build the search path with `q` percent-encoded. Spaces become `%20`, not `+`.
#[must_use]
pub fn search_path(q: &str, page: u32, page_size: u32) -> String {
    let encoded = url::form_urlencoded::byte_serialize(q.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    paged(&format!("{SEARCH_PATH}?q={encoded}"), page, page_size)
}

/// Public search; the response echoes `q`.
///
/// # Errors
///
/// Returns `VALIDATION_ERROR` for an empty or over-long query.
pub async fn search_posts(
    gateway: &Gateway,
    q: &str,
    page: Option<u32>,
    page_size: Option<u32>,
) -> Result<PagedPosts, ApiError> {
    let path = search_path(q, page.unwrap_or(DEFAULT_PAGE), page_size.unwrap_or(DEFAULT_PAGE_SIZE));
    gateway.send_json(&ApiRequest::get(path).skip_auth()).await
}

#[cfg(test)]
#[path = "search_test.rs"]
mod tests;
