//! Account endpoints: register, login, refresh, logout, password change.
//!
//! Register, login and password change adopt the returned session into the
//! store. Logout clears the local session whether or not the server call
//! succeeded, matching what the user asked for.
//!
//! Each of these first waits for any in-flight refresh (such as the one an
//! optimistic boot leaves running). Otherwise a late refresh could restore the
//! session a logout just ended, or rotate the refresh cookie after the server
//! revoked it.

use serde_json::json;

use super::types::{AuthPayload, LogoutAck};
use crate::net::error::ApiError;
use crate::net::gateway::{ApiRequest, Gateway};
use crate::net::refresh::REFRESH_PATH;

pub const REGISTER_PATH: &str = "/api/auth/register";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const CHANGE_PASSWORD_PATH: &str = "/api/auth/change-password";

/// Create an account and sign in as it.
///
/// # Errors
///
/// Returns the server's error (e.g. `VALIDATION_ERROR`, username taken).
pub async fn register(gateway: &Gateway, username: &str, password: &str) -> Result<AuthPayload, ApiError> {
    gateway.refresher().settle().await;
    let request = ApiRequest::post(REGISTER_PATH)
        .json(json!({ "username": username, "password": password }))
        .skip_auth();
    let payload: AuthPayload = gateway.send_json(&request).await?;
    adopt(gateway, &payload);
    Ok(payload)
}

/// Sign in with username and password.
///
/// # Errors
///
/// Returns the server's error for bad credentials or a banned account.
pub async fn login(gateway: &Gateway, username: &str, password: &str) -> Result<AuthPayload, ApiError> {
    gateway.refresher().settle().await;
    let request = ApiRequest::post(LOGIN_PATH)
        .json(json!({ "username": username, "password": password }))
        .skip_auth();
    let payload: AuthPayload = gateway.send_json(&request).await?;
    adopt(gateway, &payload);
    Ok(payload)
}

/// Raw call to the refresh endpoint. Does not touch the store; boot and the
/// gateway use the single-flight coordinator instead.
///
/// # Errors
///
/// Returns the server's error when the refresh cookie is missing or stale.
pub async fn refresh(gateway: &Gateway) -> Result<AuthPayload, ApiError> {
    gateway.send_json(&ApiRequest::post(REFRESH_PATH).skip_auth()).await
}

/// Invalidate the refresh credential server-side and forget the local session.
///
/// # Errors
///
/// Returns the server's error; the local session is cleared regardless.
pub async fn logout(gateway: &Gateway) -> Result<LogoutAck, ApiError> {
    gateway.refresher().settle().await;
    let result = gateway
        .send_json::<LogoutAck>(&ApiRequest::post(LOGOUT_PATH).skip_auth())
        .await;
    gateway.store().clear();
    result
}

/// Change the current user's password; the server rotates the session.
///
/// # Errors
///
/// Returns the server's error, e.g. when the current password is wrong.
pub async fn change_password(
    gateway: &Gateway,
    current_password: &str,
    new_password: &str,
) -> Result<AuthPayload, ApiError> {
    gateway.refresher().settle().await;
    let request = ApiRequest::post(CHANGE_PASSWORD_PATH)
        .json(json!({ "currentPassword": current_password, "newPassword": new_password }));
    let payload: AuthPayload = gateway.send_json(&request).await?;
    adopt(gateway, &payload);
    Ok(payload)
}

fn adopt(gateway: &Gateway, payload: &AuthPayload) {
    gateway
        .store()
        .set_auth(payload.access_token.clone(), payload.user.clone());
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
