//! Data models
//!
//! Shared between tutor-client and tutor-mock (via API).
//! All ids are opaque strings assigned by the backend.

pub mod feedback;
pub mod support;
pub mod user;

// Re-exports
pub use feedback::*;
pub use support::*;
pub use user::*;
