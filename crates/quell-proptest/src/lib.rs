//! Property-based test support for the quell echo canceller.
//!
//! Provides deterministic signal generators, proptest strategies for audio
//! frames and comparison utilities.
//!
//! # Usage
//!
//! ```ignore
//! use quell_proptest::generators::*;
//! use test_strategy::proptest;
//!
//! #[proptest]
//! fn my_test(#[strategy(frame_i16(256))] frame: Vec<i16>) {
//!     assert_eq!(frame.len(), 256);
//! }
//! ```

pub mod comparison;
pub mod generators;

pub use proptest;
pub use test_strategy;
