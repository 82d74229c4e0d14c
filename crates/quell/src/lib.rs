#![doc = include_str!("../README.md")]

pub(crate) mod audio_util;
pub(crate) mod channel;
pub mod config;
mod echo_canceller;
mod erle_estimator;
mod error;
pub mod stats;
mod stream_adapter;

// Public re-exports.
pub use config::{Algorithm, Config, MAX_CHANNELS};
pub use echo_canceller::EchoCanceller;
pub use error::Error;
pub use quell_aec::{DoubleTalkConfig, DoubleTalkDetector, SpectralConfig};
pub use quell_fixed::Q15;
pub use stats::Stats;
pub use stream_adapter::StreamAdapter;
