//! C-compatible FFI layer for the quell echo canceller.
//!
//! This crate exposes `extern "C"` functions and `#[repr(C)]` types that
//! allow C and C++ consumers to drive [`quell::EchoCanceller`].
//!
//! # Symbol prefix
//!
//! - Functions: `quell_*`
//! - Types: `Quell*`
//!
//! # Thread safety
//!
//! **NOT thread-safe.** All calls on the same [`QuellEchoCanceller`] handle
//! must be serialized by the caller. Distinct handles are independent.

mod conversions;
pub mod functions;
mod panic_guard;
pub mod types;

pub use functions::*;
pub use types::*;
