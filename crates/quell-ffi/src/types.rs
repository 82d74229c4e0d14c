//! C-compatible type definitions for the quell C API.
//!
//! All types here are `#[repr(C)]` and are safe to pass across FFI boundaries.

use quell::EchoCanceller;

// ---------------------------------------------------------------------------
// Error codes
// ---------------------------------------------------------------------------

/// Error codes returned by C API functions.
///
/// `0` = success, negative = error.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuellError {
    /// Operation succeeded.
    None = 0,
    /// Null pointer passed to a function that requires non-null.
    NullPointer = -1,
    /// Internal error (panic caught at FFI boundary).
    Internal = -2,
    /// Bad sample rate.
    BadSampleRate = -3,
    /// Bad number of channels.
    BadNumberChannels = -4,
    /// Zero frame length.
    BadFrameLength = -5,
    /// A buffer is shorter than the frame.
    BadDataLength = -6,
    /// Buffers overlap in a way the engine cannot process.
    BadArgument = -7,
    /// Filter or double-talk settings are invalid.
    InvalidConfig = -8,
    /// Requested algorithm is not implemented.
    UnsupportedAlgorithm = -9,
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Adaptive filter algorithm.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuellAlgorithm {
    Nlms = 0,
    /// Reserved; rejected by `quell_create`.
    Rls = 1,
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Flat echo canceller configuration.
///
/// Obtain a default-initialized instance via `quell_config_default()`.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct QuellConfig {
    pub algorithm: QuellAlgorithm,
    pub sample_rate_hz: u32,
    pub frame_size: usize,
    pub filter_length: usize,
    pub step_size: f32,
    pub regularization: f32,
    pub use_fixed_point: bool,
    pub num_channels: usize,

    // -- Double-talk detection --
    pub double_talk_enabled: bool,
    pub near_to_far_threshold: f32,
    pub coherence_threshold: f32,
    pub smoothing_alpha: f32,
    pub hangover_frames: u32,

    // -- Spectral coherence --
    pub spectral_enabled: bool,
    pub fft_size: usize,
    pub num_bins: usize,
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Echo canceller statistics.
///
/// Each optional metric has a `has_*` flag indicating whether it is valid.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct QuellStats {
    pub has_erle_db: bool,
    pub erle_db: f64,
    pub has_latency_ms: bool,
    pub latency_ms: f64,
    pub samples_processed: u64,
    pub frames_processed: u64,
    pub frozen_channels: usize,
}

// ---------------------------------------------------------------------------
// Opaque handle
// ---------------------------------------------------------------------------

/// Opaque echo canceller handle.
///
/// Created by `quell_create()`, freed by `quell_destroy()`.
#[derive(Debug)]
pub struct QuellEchoCanceller {
    pub(crate) inner: EchoCanceller,
}
