//! Settings for the adaptive filter and the double-talk detector.

use std::fmt;

/// Error returned when a filter or detector configuration is invalid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// The filter must have at least one tap.
    ZeroFilterLength,
    /// Step size must be finite and non-negative.
    InvalidStepSize { step_size: f32 },
    /// Regularization must be finite and strictly positive.
    InvalidRegularization { regularization: f32 },
    /// Smoothing factor must lie in `[0, 1]`.
    InvalidSmoothing { alpha: f32 },
    /// Ratio and coherence thresholds must be finite and non-negative.
    InvalidThreshold { threshold: f32 },
    /// Spectral transform size must be non-zero.
    ZeroFftSize,
    /// Bin count must be in `1..=fft_size / 2`.
    InvalidBinCount { num_bins: usize, fft_size: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::ZeroFilterLength => write!(f, "filter length must be non-zero"),
            Self::InvalidStepSize { step_size } => {
                write!(f, "invalid step size {step_size}; expected a finite value >= 0")
            }
            Self::InvalidRegularization { regularization } => write!(
                f,
                "invalid regularization {regularization}; expected a finite value > 0"
            ),
            Self::InvalidSmoothing { alpha } => {
                write!(f, "invalid smoothing factor {alpha}; expected 0.0..=1.0")
            }
            Self::InvalidThreshold { threshold } => {
                write!(f, "invalid threshold {threshold}; expected a finite value >= 0")
            }
            Self::ZeroFftSize => write!(f, "spectral transform size must be non-zero"),
            Self::InvalidBinCount { num_bins, fft_size } => write!(
                f,
                "invalid bin count {num_bins}; expected 1..={}",
                fft_size / 2
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// NLMS filter settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NlmsConfig {
    /// Number of taps `L`.
    pub filter_length: usize,
    /// Adaptation step size `mu`.
    pub step_size: f32,
    /// Regularization `delta` added to the input power.
    pub regularization: f32,
}

impl Default for NlmsConfig {
    fn default() -> Self {
        Self {
            filter_length: 1024,
            step_size: 0.1,
            regularization: 1e-6,
        }
    }
}

impl NlmsConfig {
    /// Checks every field against its valid range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.filter_length == 0 {
            return Err(ConfigError::ZeroFilterLength);
        }
        if !self.step_size.is_finite() || self.step_size < 0.0 {
            return Err(ConfigError::InvalidStepSize {
                step_size: self.step_size,
            });
        }
        if !self.regularization.is_finite() || self.regularization <= 0.0 {
            return Err(ConfigError::InvalidRegularization {
                regularization: self.regularization,
            });
        }
        Ok(())
    }
}

/// Double-talk detector settings.
///
/// Double talk is declared when the smoothed near/far power ratio exceeds
/// [`near_to_far_threshold`](Self::near_to_far_threshold) while the
/// far/near coherence stays below
/// [`coherence_threshold`](Self::coherence_threshold).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DoubleTalkConfig {
    /// Near/far smoothed power ratio above which near-end speech is suspected.
    pub near_to_far_threshold: f32,
    /// Coherence below which the near-end is considered independent of the far-end.
    pub coherence_threshold: f32,
    /// Exponential smoothing factor for all power estimates, in `[0, 1]`.
    pub smoothing_alpha: f32,
    /// Frames during which adaptation stays frozen after a detection.
    pub hangover_frames: u32,
    /// Use per-bin spectral coherence instead of the broadband estimate.
    /// Set to `Some(...)` to enable.
    pub spectral: Option<SpectralConfig>,
}

impl Default for DoubleTalkConfig {
    fn default() -> Self {
        Self {
            near_to_far_threshold: 1.5,
            coherence_threshold: 0.3,
            smoothing_alpha: 0.9,
            hangover_frames: 3,
            spectral: None,
        }
    }
}

impl DoubleTalkConfig {
    /// Checks every field against its valid range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.smoothing_alpha) {
            return Err(ConfigError::InvalidSmoothing {
                alpha: self.smoothing_alpha,
            });
        }
        for threshold in [self.near_to_far_threshold, self.coherence_threshold] {
            if !threshold.is_finite() || threshold < 0.0 {
                return Err(ConfigError::InvalidThreshold { threshold });
            }
        }
        if let Some(spectral) = &self.spectral {
            spectral.validate()?;
        }
        Ok(())
    }
}

/// Frequency-domain coherence settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpectralConfig {
    /// Transform length `N`. Frames longer than `N` are truncated, shorter
    /// frames are zero padded.
    pub fft_size: usize,
    /// Number of low-frequency bins analysed, at most `fft_size / 2`.
    pub num_bins: usize,
}

impl Default for SpectralConfig {
    fn default() -> Self {
        Self {
            fft_size: 512,
            num_bins: 32,
        }
    }
}

impl SpectralConfig {
    /// Checks every field against its valid range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fft_size == 0 {
            return Err(ConfigError::ZeroFftSize);
        }
        if self.num_bins == 0 || self.num_bins > self.fft_size / 2 {
            return Err(ConfigError::InvalidBinCount {
                num_bins: self.num_bins,
                fft_size: self.fft_size,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(NlmsConfig::default().validate(), Ok(()));
        assert_eq!(DoubleTalkConfig::default().validate(), Ok(()));
        assert_eq!(SpectralConfig::default().validate(), Ok(()));
    }

    #[test]
    fn nlms_rejects_zero_length() {
        let config = NlmsConfig {
            filter_length: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroFilterLength));
    }

    #[test]
    fn nlms_rejects_non_finite_parameters() {
        let config = NlmsConfig {
            step_size: f32::NAN,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidStepSize { .. })
        ));

        let config = NlmsConfig {
            regularization: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidRegularization {
                regularization: 0.0
            })
        );
    }

    #[test]
    fn double_talk_rejects_out_of_range_alpha() {
        let config = DoubleTalkConfig {
            smoothing_alpha: 1.5,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidSmoothing { alpha: 1.5 })
        );
    }

    #[test]
    fn double_talk_rejects_negative_threshold() {
        let config = DoubleTalkConfig {
            coherence_threshold: -0.1,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidThreshold { threshold: -0.1 })
        );
    }

    #[test]
    fn spectral_bin_count_bounded_by_half_fft() {
        let config = SpectralConfig {
            fft_size: 64,
            num_bins: 33,
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidBinCount {
                num_bins: 33,
                fft_size: 64
            })
        );
        let config = SpectralConfig {
            fft_size: 64,
            num_bins: 32,
        };
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn error_messages_name_the_value() {
        let msg = ConfigError::InvalidBinCount {
            num_bins: 40,
            fft_size: 64,
        }
        .to_string();
        assert!(msg.contains("40"), "{msg}");
        assert!(msg.contains("1..=32"), "{msg}");
    }
}
