//! Networking for the REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` is the raw HTTP seam (reqwest in production, mocks in tests),
//! `envelope` decodes the backend's success/error wrapper, `gateway` layers
//! bearer auth and the refresh-and-retry protocol on top, and `refresh`
//! guarantees at most one refresh call in flight. `cookies` keeps the
//! out-of-band refresh credential across process restarts.

pub mod cookies;
pub mod envelope;
pub mod error;
pub mod gateway;
pub mod refresh;
pub mod transport;
