//! HTTP/REST API layer for lexiflow.
//!
//! Axum-based REST API exposing workflow trigger/status/resume, text
//! analysis and a health check, with CORS support.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod response;
pub mod router;
