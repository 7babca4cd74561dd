//! Repository trait definitions (ports).
//!
//! The infrastructure layer (lexiflow-infra) implements these traits with
//! SQLite. The core crate never depends on a specific storage technology.

pub mod memory;
pub mod run;

pub use memory::InMemoryRunRepository;
pub use run::RunRepository;
