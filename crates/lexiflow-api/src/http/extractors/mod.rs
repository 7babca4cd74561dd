//! Request extractors.

pub mod json;
pub mod owner;
