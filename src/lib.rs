//! Quillpost: client core for the Quillpost blogging API.
//!
//! SYSTEM CONTEXT
//! ==============
//! Front ends (the bundled CLI, or any embedding UI) talk to the blog backend
//! exclusively through this crate. It owns the one piece of client state that
//! matters: the authenticated session.
//!
//! ARCHITECTURE
//! ============
//! - `session`: persisted session store (single source of truth + observers).
//! - `net`: transport seam, response envelope, authenticated gateway and the
//!   single-flight refresh coordinator.
//! - `boot`: strict vs. optimistic session hydration at process start.
//! - `guard`: render-time route guards over a session snapshot.
//! - `api`: typed bindings for every backend endpoint.
//! - `validation`: caller-local form checks that never touch the session.
//! - `client`: the `BlogClient` facade wiring all of the above together.

pub mod api;
pub mod boot;
pub mod client;
pub mod config;
pub mod guard;
pub mod net;
pub mod session;
pub mod validation;

#[cfg(test)]
mod test_helpers;

pub use boot::{BootPhase, BootReport, BootSequencer};
pub use client::{BlogClient, ClientError};
pub use config::{AuthErrorPolicy, BootPolicy, ClientConfig, ConfigError, Timeouts};
pub use guard::GuardDecision;
pub use net::error::ApiError;
pub use net::gateway::{ApiRequest, Gateway};
pub use session::{Role, Session, SessionStore, Subscription, UserProfile};
