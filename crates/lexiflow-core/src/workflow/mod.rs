//! Workflow engine core: definitions, registry, step execution and durable
//! checkpointing.
//!
//! - `definition` -- structural validation, trigger-input and resume-data contracts
//! - `builtin` -- the `vocabulary` and `lesson` workflows
//! - `registry` -- name -> definition lookup, built once at startup
//! - `context` -- per-step view of a run rebuilt from its checkpoints
//! - `step_runner` -- dispatch for extract / enrich / generate / parallel / assemble
//! - `checkpoint` -- versioned state transitions over `RunRepository`
//! - `engine` -- trigger, status, resume and the expiry sweep

pub mod builtin;
pub mod checkpoint;
pub mod context;
pub mod definition;
pub mod engine;
pub mod registry;
pub mod step_runner;

pub use engine::{EngineError, WorkflowEngine};
pub use registry::WorkflowRegistry;
pub use step_runner::StepRunner;
