//! Adaptive filtering and double-talk detection for acoustic echo cancellation.
//!
//! Each echo canceller channel pairs one [`NlmsFilter`] with one
//! [`DoubleTalkDetector`]. The detector looks at a whole frame and decides
//! whether the filter may adapt; the filter then runs once per sample.
//!
//! ```
//! use quell_aec::{DoubleTalkConfig, DoubleTalkDetector, FloatNlmsFilter, NlmsConfig};
//!
//! let mut filter = FloatNlmsFilter::new(&NlmsConfig::default()).unwrap();
//! let mut detector = DoubleTalkDetector::new(&DoubleTalkConfig::default()).unwrap();
//!
//! let far = [1000i16; 256];
//! let near = [500i16; 256];
//! let adapt = detector.update(&far, &near, 256, 1);
//! for (&x, &d) in far.iter().zip(&near) {
//!     let _error = filter.process(f32::from(x) / 32768.0, f32::from(d) / 32768.0, adapt);
//! }
//! ```

pub mod config;
pub mod double_talk_detector;
pub mod nlms_filter;
pub(crate) mod spectral_coherence;

pub use config::{ConfigError, DoubleTalkConfig, NlmsConfig, SpectralConfig};
pub use double_talk_detector::DoubleTalkDetector;
pub use nlms_filter::{FixedNlmsFilter, FloatNlmsFilter, NlmsFilter};

/// Scale applied to `i16` samples before power estimation.
pub(crate) const S16_TO_UNIT: f64 = 1.0 / 32768.0;

/// Floor used in ratio and coherence denominators.
pub(crate) const POWER_EPSILON: f32 = 1e-12;
