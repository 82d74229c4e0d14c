//! Echo canceller configuration.

use quell_aec::{DoubleTalkConfig, NlmsConfig};

use crate::error::Error;

/// Upper bound on the number of channels one engine processes.
pub const MAX_CHANNELS: usize = 8;

/// Minimum supported sample rate in Hz.
pub const MIN_SAMPLE_RATE_HZ: u32 = 8_000;
/// Maximum supported sample rate in Hz.
pub const MAX_SAMPLE_RATE_HZ: u32 = 384_000;

/// Adaptive filter algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Normalized least mean squares.
    #[default]
    Nlms,
    /// Recursive least squares. Reserved; rejected at construction.
    Rls,
}

/// Settings for an [`EchoCanceller`](crate::EchoCanceller).
///
/// The configuration is fixed for the lifetime of an engine. Build a new
/// engine to change it.
///
/// # Example
///
/// ```
/// use quell::{Config, DoubleTalkConfig, SpectralConfig};
///
/// let config = Config {
///     num_channels: 2,
///     use_fixed_point: false,
///     double_talk: Some(DoubleTalkConfig {
///         spectral: Some(SpectralConfig::default()),
///         ..Default::default()
///     }),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Adaptive filter algorithm.
    pub algorithm: Algorithm,
    /// Sample rate in Hz. Only used to derive frame sizes and for reporting.
    pub sample_rate_hz: u32,
    /// Samples per channel in one frame.
    pub frame_size: usize,
    /// Number of filter taps per channel.
    pub filter_length: usize,
    /// NLMS step size `mu`.
    pub step_size: f32,
    /// NLMS regularization `delta`.
    pub regularization: f32,
    /// Run the filters on saturating Q15 samples instead of `f32`.
    pub use_fixed_point: bool,
    /// Channels to allocate filters for. Values above [`MAX_CHANNELS`] are
    /// capped.
    pub num_channels: usize,
    /// Double-talk detection. `None` lets the filters adapt on every frame.
    pub double_talk: Option<DoubleTalkConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::Nlms,
            sample_rate_hz: 16_000,
            frame_size: 256,
            filter_length: 1024,
            step_size: 0.1,
            regularization: 1e-6,
            use_fixed_point: true,
            num_channels: 1,
            double_talk: Some(DoubleTalkConfig::default()),
        }
    }
}

impl Config {
    /// Checks every setting; [`EchoCanceller::new`](crate::EchoCanceller::new)
    /// calls this first.
    pub fn validate(&self) -> Result<(), Error> {
        if self.algorithm != Algorithm::Nlms {
            return Err(Error::UnsupportedAlgorithm {
                algorithm: self.algorithm,
            });
        }
        if !(MIN_SAMPLE_RATE_HZ..=MAX_SAMPLE_RATE_HZ).contains(&self.sample_rate_hz) {
            return Err(Error::BadSampleRate {
                sample_rate_hz: self.sample_rate_hz,
            });
        }
        if self.frame_size == 0 {
            return Err(Error::BadFrameLength { frame_length: 0 });
        }
        if self.num_channels == 0 {
            return Err(Error::BadNumberChannels { num_channels: 0 });
        }
        self.nlms().validate()?;
        if let Some(double_talk) = &self.double_talk {
            double_talk.validate()?;
        }
        Ok(())
    }

    /// Filter settings for one channel.
    pub fn nlms(&self) -> NlmsConfig {
        NlmsConfig {
            filter_length: self.filter_length,
            step_size: self.step_size,
            regularization: self.regularization,
        }
    }

    /// Number of channels an engine allocates for this configuration.
    pub fn effective_channels(&self) -> usize {
        self.num_channels.min(MAX_CHANNELS)
    }

    /// Samples in one interleaved frame across all effective channels.
    pub fn samples_per_frame(&self) -> usize {
        self.frame_size * self.effective_channels()
    }
}
