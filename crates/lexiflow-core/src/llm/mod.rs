//! Generation provider abstractions.
//!
//! - `GenerationProvider`: RPITIT trait for concrete provider implementations
//! - `BoxGenerationProvider`: Object-safe wrapper for dynamic dispatch

pub mod box_provider;
pub mod provider;

pub use box_provider::BoxGenerationProvider;
pub use provider::GenerationProvider;
