//! Route table and navigation guards.
//!
//! DESIGN
//! ======
//! Guards are pure functions of a session snapshot. They never touch the
//! network and never wait, so a caller can evaluate them on every render or
//! before every command.
//!
//! - Protected: anonymous sessions are redirected to [`LOGIN_PATH`], carrying
//!   the requested location so login can send the user back.
//! - Admin: anonymous sessions are redirected (without an origin); a signed-in
//!   non-admin gets [`GuardDecision::Forbidden`], which is rendered in place.

use crate::session::Session;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Outcome of applying a guard to a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    RedirectToLogin { from: Option<String> },
    /// The route exists but this user may not see it.
    Forbidden,
    NotFound,
}

/// Access level a route requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
    Admin,
}

const ROUTES: &[(&str, Access)] = &[
    ("/", Access::Public),
    ("/login", Access::Public),
    ("/posts/:id", Access::Public),
    ("/search", Access::Public),
    ("/collections/:id", Access::Public),
    ("/editor/new", Access::Protected),
    ("/editor/:id", Access::Protected),
    ("/collections", Access::Protected),
    ("/account/password", Access::Protected),
    ("/admin/users", Access::Admin),
];

/// Guard for routes that need any signed-in user.
#[must_use]
pub fn protected(session: &Session, location: &str) -> GuardDecision {
    if session.is_authenticated() {
        GuardDecision::Allow
    } else {
        GuardDecision::RedirectToLogin { from: Some(location.to_owned()) }
    }
}

/// Guard for administrator-only routes.
#[must_use]
pub fn admin(session: &Session) -> GuardDecision {
    match session.user() {
        None => GuardDecision::RedirectToLogin { from: None },
        Some(user) if user.is_admin() => GuardDecision::Allow,
        Some(_) => GuardDecision::Forbidden,
    }
}

/// Access level for `path`, or `None` when no route matches. Query strings
/// and fragments are ignored; `:id` segments match any non-empty segment.
#[must_use]
pub fn route_access(path: &str) -> Option<Access> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let path = match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };
    ROUTES
        .iter()
        .find(|(pattern, _)| matches_pattern(pattern, path))
        .map(|&(_, access)| access)
}

fn matches_pattern(pattern: &str, path: &str) -> bool {
    let mut want = pattern.split('/');
    let mut got = path.split('/');
    loop {
        match (want.next(), got.next()) {
            (None, None) => return true,
            (Some(w), Some(g)) if w.starts_with(':') => {
                if g.is_empty() {
                    return false;
                }
            }
            (Some(w), Some(g)) if w == g => {}
            _ => return false,
        }
    }
}

/// Resolve the route for `path` and apply its guard.
#[must_use]
pub fn guard_route(session: &Session, path: &str) -> GuardDecision {
    match route_access(path) {
        None => GuardDecision::NotFound,
        Some(Access::Public) => GuardDecision::Allow,
        Some(Access::Protected) => protected(session, path),
        Some(Access::Admin) => admin(session),
    }
}

/// Where to go after a successful login. Only same-site absolute paths are
/// honoured; anything else falls back to the home page.
#[must_use]
pub fn post_login_redirect(from: Option<&str>) -> &str {
    match from {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => HOME_PATH,
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
