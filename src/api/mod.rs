//! Typed bindings for the blog REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each submodule maps one backend area onto async functions over a
//! [`Gateway`](crate::net::gateway::Gateway). Public reads are sent with
//! `skip_auth`; everything that acts on behalf of the user is authenticated
//! and therefore subject to the refresh-and-retry protocol.
//!
//! ERROR HANDLING
//! ==============
//! Every function returns `Result<_, ApiError>`; callers render the error.
//! Only the auth bindings write to the session store directly.

pub mod admin;
pub mod auth;
pub mod collections;
pub mod interactions;
pub mod posts;
pub mod search;
pub mod types;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_ADMIN_PAGE_SIZE: u32 = 20;

fn paged(path: &str, page: u32, page_size: u32) -> String {
    let sep = if path.contains('?') { '&' } else { '?' };
    format!("{path}{sep}page={page}&pageSize={page_size}")
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
