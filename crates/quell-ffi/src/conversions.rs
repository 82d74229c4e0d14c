//! Conversions between C API types and Rust types.

use quell::config::Algorithm;
use quell::{Config, DoubleTalkConfig, Error, SpectralConfig, Stats};

use crate::types::{QuellAlgorithm, QuellConfig, QuellError, QuellStats};

// ---------------------------------------------------------------------------
// QuellConfig <-> Config
// ---------------------------------------------------------------------------

impl QuellConfig {
    /// Convert from the flat C config to [`Config`].
    pub(crate) fn to_rust(self) -> Config {
        Config {
            algorithm: match self.algorithm {
                QuellAlgorithm::Nlms => Algorithm::Nlms,
                QuellAlgorithm::Rls => Algorithm::Rls,
            },
            sample_rate_hz: self.sample_rate_hz,
            frame_size: self.frame_size,
            filter_length: self.filter_length,
            step_size: self.step_size,
            regularization: self.regularization,
            use_fixed_point: self.use_fixed_point,
            num_channels: self.num_channels,
            double_talk: self.double_talk_enabled.then(|| DoubleTalkConfig {
                near_to_far_threshold: self.near_to_far_threshold,
                coherence_threshold: self.coherence_threshold,
                smoothing_alpha: self.smoothing_alpha,
                hangover_frames: self.hangover_frames,
                spectral: self.spectral_enabled.then_some(SpectralConfig {
                    fft_size: self.fft_size,
                    num_bins: self.num_bins,
                }),
            }),
        }
    }

    /// Convert from [`Config`] to the flat C config.
    ///
    /// Disabled sub-components keep their default parameters so that
    /// enabling them from C yields sensible values.
    pub(crate) fn from_rust(config: &Config) -> Self {
        let double_talk = config.double_talk.unwrap_or_default();
        let spectral = double_talk.spectral.unwrap_or_default();
        Self {
            algorithm: match config.algorithm {
                Algorithm::Nlms => QuellAlgorithm::Nlms,
                Algorithm::Rls => QuellAlgorithm::Rls,
            },
            sample_rate_hz: config.sample_rate_hz,
            frame_size: config.frame_size,
            filter_length: config.filter_length,
            step_size: config.step_size,
            regularization: config.regularization,
            use_fixed_point: config.use_fixed_point,
            num_channels: config.num_channels,
            double_talk_enabled: config.double_talk.is_some(),
            near_to_far_threshold: double_talk.near_to_far_threshold,
            coherence_threshold: double_talk.coherence_threshold,
            smoothing_alpha: double_talk.smoothing_alpha,
            hangover_frames: double_talk.hangover_frames,
            spectral_enabled: double_talk.spectral.is_some(),
            fft_size: spectral.fft_size,
            num_bins: spectral.num_bins,
        }
    }
}

// ---------------------------------------------------------------------------
// Error -> QuellError
// ---------------------------------------------------------------------------

impl From<Error> for QuellError {
    fn from(err: Error) -> Self {
        match err {
            Error::UnsupportedAlgorithm { .. } => Self::UnsupportedAlgorithm,
            Error::BadSampleRate { .. } => Self::BadSampleRate,
            Error::BadFrameLength { .. } => Self::BadFrameLength,
            Error::BadNumberChannels { .. } => Self::BadNumberChannels,
            Error::BadDataLength { .. } => Self::BadDataLength,
            Error::InvalidConfig(_) => Self::InvalidConfig,
        }
    }
}

// ---------------------------------------------------------------------------
// Stats -> QuellStats
// ---------------------------------------------------------------------------

impl From<&Stats> for QuellStats {
    fn from(stats: &Stats) -> Self {
        Self {
            has_erle_db: stats.echo_return_loss_enhancement.is_some(),
            erle_db: stats.echo_return_loss_enhancement.unwrap_or(0.0),
            has_latency_ms: stats.latency_ms.is_some(),
            latency_ms: stats.latency_ms.unwrap_or(0.0),
            samples_processed: stats.samples_processed,
            frames_processed: stats.frames_processed,
            frozen_channels: stats.frozen_channels,
        }
    }
}
