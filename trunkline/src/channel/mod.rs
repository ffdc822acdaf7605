//! Channel layer for expect-style pattern matching.
//!
//! This module owns the accumulating output buffer and the pattern race the
//! console session's waits are built on, including ANSI stripping.

mod buffer;
mod patterns;

pub use buffer::ExpectBuffer;
pub use patterns::{PatternHit, earliest_match};
