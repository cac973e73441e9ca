//! Tutor Mock - in-memory tutoring backend
//!
//! Implements the Support and evaluation endpoints the client consumes,
//! with the server-side rules enforced: ownership, forward-only status,
//! single chat linkage and role-gated evaluations. Used by the client's
//! integration tests and for local development.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod state;

pub use api::router;
pub use error::{AppError, AppResult};
pub use state::{MockState, MockUser};
