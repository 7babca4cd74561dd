//! HTTP request handlers for the REST API.

pub mod analyze;
pub mod health;
pub mod workflow;
