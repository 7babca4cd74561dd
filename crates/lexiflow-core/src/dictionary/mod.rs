//! Dictionary enrichment: provider trait, type-erased wrapper, and router.

pub mod provider;
pub mod router;

pub use provider::{BoxDictionaryProvider, DictionaryProvider};
pub use router::DictionaryRouter;
