//! Plan Digest Module
//!
//! Builds a bounded, size-predictable projection of a parsed plan for an
//! external analysis service. The full query text and node properties never
//! leave the process through a digest.

mod compactor;

pub use compactor::*;
