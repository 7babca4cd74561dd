//! Infrastructure layer for lexiflow.
//!
//! Contains implementations of the traits defined in `lexiflow-core`:
//! SQLite run storage, the Anthropic generation provider, HTTP dictionary
//! providers, plus config loading and data directory resolution.

pub mod config;
pub mod dictionary;
pub mod filesystem;
pub mod llm;
pub mod sqlite;
