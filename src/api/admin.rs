//! Administrator endpoints. The server enforces the admin role; the route
//! guard only keeps non-admins from trying.

use serde_json::json;

use super::types::{PagedUsers, Role, UserProfile};
use super::{DEFAULT_ADMIN_PAGE_SIZE, DEFAULT_PAGE, paged};
use crate::net::error::ApiError;
use crate::net::gateway::{ApiRequest, Gateway};

pub const ADMIN_USERS_PATH: &str = "/api/admin/users";

fn user_path(user_id: i64) -> String {
    format!("{ADMIN_USERS_PATH}/{user_id}")
}

/// # Errors
///
/// Returns `FORBIDDEN` (403) for non-admin callers.
pub async fn list_users(gateway: &Gateway, page: Option<u32>, page_size: Option<u32>) -> Result<PagedUsers, ApiError> {
    let path = paged(
        ADMIN_USERS_PATH,
        page.unwrap_or(DEFAULT_PAGE),
        page_size.unwrap_or(DEFAULT_ADMIN_PAGE_SIZE),
    );
    gateway.send_json(&ApiRequest::get(path)).await
}

/// # Errors
///
/// Returns the server or transport error.
pub async fn update_user_role(gateway: &Gateway, user_id: i64, role: Role) -> Result<UserProfile, ApiError> {
    let request = ApiRequest::put(format!("{}/role", user_path(user_id))).json(json!({ "role": role }));
    gateway.send_json(&request).await
}

/// # Errors
///
/// Returns the server or transport error.
pub async fn update_user_ban(gateway: &Gateway, user_id: i64, is_banned: bool) -> Result<UserProfile, ApiError> {
    let request = ApiRequest::put(format!("{}/ban", user_path(user_id))).json(json!({ "isBanned": is_banned }));
    gateway.send_json(&request).await
}

#[cfg(test)]
#[path = "admin_test.rs"]
mod tests;
