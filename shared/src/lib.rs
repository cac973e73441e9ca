//! Shared types for the tutoring support workflow
//!
//! Wire models and domain invariants used by both `tutor-client` and the
//! `tutor-mock` reference backend: Support records and their lifecycle,
//! attachment metadata, rating and comparison feedback, the `{detail}` error
//! envelope and validation helpers.

pub mod error;
pub mod models;
pub mod validation;

// Re-exports
pub use error::{ErrorBody, ValidationError};
pub use chrono;
pub use http;
pub use serde::{Deserialize, Serialize};
