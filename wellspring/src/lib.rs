//! Wellspring property-based testing library.
//!
//! This is the main entry point for the Wellspring library: a seeded,
//! deterministic test-input source with interval tracking for shrink
//! support.

pub use wellspring_core::*;

// Re-export derive macros when available
#[cfg(feature = "derive")]
pub use wellspring_derive::*;
