//! Shared domain types for lexiflow.
//!
//! This crate contains the data shapes passed between the pipeline stages:
//! candidates, dictionary entries, generated items, workflow runs and
//! definitions, generation requests, configuration, and error enums.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror, schemars.

pub mod analysis;
pub mod config;
pub mod content;
pub mod dictionary;
pub mod error;
pub mod language;
pub mod llm;
pub mod workflow;
