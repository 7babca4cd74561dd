//! Pipeline logic and trait seams for lexiflow.
//!
//! This crate defines the ports (provider and repository traits) that the
//! infrastructure layer implements. It depends only on `lexiflow-types` --
//! never on `lexiflow-infra` or any database/IO crate.

pub mod analysis;
pub mod dictionary;
pub mod limiter;
pub mod llm;
pub mod refine;
pub mod repository;
pub mod retry;
pub mod workflow;
