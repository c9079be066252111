//! Cookie jar that survives process restarts.
//!
//! The backend issues the refresh credential as a cookie. A browser keeps that
//! cookie between visits; this jar does the same for a native client by
//! mirroring it into a [`RecordStorage`] record.
//!
//! TRADE-OFFS
//! ==========
//! The client talks to a single origin, so `Domain` is ignored. Cookies are
//! keyed by name and path, sent only to matching paths, and dropped once their
//! `Max-Age` or `Expires` deadline passes. Session cookies (no deadline) are
//! kept across restarts; the refresh credential is only useful that way.

use std::sync::{Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use cookie::Cookie;
use reqwest::Url;
use reqwest::cookie::CookieStore;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};

use crate::session::storage::{MemoryStorage, RecordStorage};

/// Key under which the cookie jar is persisted.
pub const COOKIE_RECORD_KEY: &str = "quillpost_cookies";

/// One stored cookie. `expires_at` is a unix timestamp in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCookie {
    name: String,
    value: String,
    path: String,
    #[serde(default)]
    expires_at: Option<i64>,
}

impl StoredCookie {
    fn is_expired(&self, now: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// RFC 6265 path-match.
    fn matches_path(&self, request_path: &str) -> bool {
        if request_path == self.path {
            return true;
        }
        request_path.starts_with(&self.path)
            && (self.path.ends_with('/') || request_path[self.path.len()..].starts_with('/'))
    }
}

pub struct PersistentCookieJar {
    cookies: Mutex<Vec<StoredCookie>>,
    storage: Box<dyn RecordStorage>,
}

impl PersistentCookieJar {
    /// Load previously stored cookies; unreadable records start an empty jar.
    #[must_use]
    pub fn load(storage: Box<dyn RecordStorage>) -> Self {
        let mut cookies: Vec<StoredCookie> = match storage.load() {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_default(),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "cookie record unreadable; starting empty");
                Vec::new()
            }
        };
        let now = unix_now();
        cookies.retain(|c| !c.is_expired(now));
        Self { cookies: Mutex::new(cookies), storage }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::load(Box::new(MemoryStorage::new()))
    }

    /// Value of the live cookie called `name`, whatever its path.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<String> {
        let now = unix_now();
        self.cookies
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|c| c.name == name && !c.is_expired(now))
            .map(|c| c.value.clone())
    }

    /// Apply one `Set-Cookie` header received for `url`. Returns `true` if the
    /// jar changed. Malformed headers are ignored.
    pub fn apply_set_cookie(&self, header: &str, url: &Url) -> bool {
        let cookie = match Cookie::parse(header) {
            Ok(cookie) => cookie,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed set-cookie header");
                return false;
            }
        };
        let now = unix_now();
        let path = cookie
            .path()
            .filter(|p| p.starts_with('/'))
            .map_or_else(|| default_path(url), ToOwned::to_owned);

        // Max-Age wins over Expires when both are present.
        let expires_at = match cookie.max_age() {
            Some(age) => Some(now.saturating_add(age.whole_seconds())),
            None => cookie.expires_datetime().map(|at| at.unix_timestamp()),
        };
        let incoming = StoredCookie {
            name: cookie.name().to_owned(),
            value: cookie.value().to_owned(),
            path,
            expires_at,
        };

        let mut cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        let before = cookies.clone();
        cookies.retain(|c| !(c.name == incoming.name && c.path == incoming.path) && !c.is_expired(now));
        if !incoming.is_expired(now) {
            cookies.push(incoming);
            cookies.sort_by(|a, b| (&a.name, &a.path).cmp(&(&b.name, &b.path)));
        }
        let changed = *cookies != before;
        if changed {
            self.persist(&cookies);
        }
        changed
    }

    /// `Cookie` request header for `url`, or `None` when nothing applies.
    #[must_use]
    pub fn header_value(&self, url: &Url) -> Option<String> {
        let now = unix_now();
        let cookies = self.cookies.lock().unwrap_or_else(PoisonError::into_inner);
        let pairs: Vec<String> = cookies
            .iter()
            .filter(|c| !c.is_expired(now) && c.matches_path(url.path()))
            .map(|c| Cookie::new(c.name.as_str(), c.value.as_str()).stripped().to_string())
            .collect();
        if pairs.is_empty() { None } else { Some(pairs.join("; ")) }
    }

    fn persist(&self, cookies: &[StoredCookie]) {
        let result = if cookies.is_empty() {
            self.storage.remove()
        } else {
            match serde_json::to_string(cookies) {
                Ok(raw) => self.storage.save(&raw),
                Err(e) => {
                    tracing::warn!(error = %e, "cookie record encode failed");
                    return;
                }
            }
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "cookie record write failed");
        }
    }
}

impl CookieStore for PersistentCookieJar {
    fn set_cookies(&self, cookie_headers: &mut dyn Iterator<Item = &HeaderValue>, url: &Url) {
        for header in cookie_headers {
            if let Ok(raw) = header.to_str() {
                self.apply_set_cookie(raw, url);
            }
        }
    }

    fn cookies(&self, url: &Url) -> Option<HeaderValue> {
        self.header_value(url)
            .and_then(|value| HeaderValue::from_str(&value).ok())
    }
}

/// Directory of the request path, per RFC 6265 section 5.1.4.
fn default_path(url: &Url) -> String {
    let path = url.path();
    match path.rfind('/') {
        Some(0) | None => "/".to_owned(),
        Some(idx) => path[..idx].to_owned(),
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
}

#[cfg(test)]
#[path = "cookies_test.rs"]
mod tests;
