use std::{error, fmt};

use quell_aec::ConfigError;

use crate::config::{Algorithm, MAX_CHANNELS, MAX_SAMPLE_RATE_HZ, MIN_SAMPLE_RATE_HZ};

/// Errors returned by [`EchoCanceller`](crate::EchoCanceller) and
/// [`StreamAdapter`](crate::StreamAdapter).
///
/// Any call that returns an error leaves its output buffers and the engine
/// state untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Error {
    /// Only [`Algorithm::Nlms`] is implemented.
    UnsupportedAlgorithm { algorithm: Algorithm },
    /// Sample rate outside the supported range.
    BadSampleRate { sample_rate_hz: u32 },
    /// Frame length is zero or does not match the configured frame size.
    BadFrameLength { frame_length: usize },
    /// Channel count is zero or above [`MAX_CHANNELS`].
    BadNumberChannels { num_channels: usize },
    /// A buffer holds fewer samples than the frame requires.
    BadDataLength { expected: usize, actual: usize },
    /// Filter or double-talk settings are invalid.
    InvalidConfig(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedAlgorithm { algorithm } => {
                write!(f, "algorithm {algorithm:?} is not supported")
            }
            Self::BadSampleRate { sample_rate_hz } => write!(
                f,
                "unsupported sample rate {sample_rate_hz}; expected {MIN_SAMPLE_RATE_HZ}..={MAX_SAMPLE_RATE_HZ}"
            ),
            Self::BadFrameLength { frame_length } => {
                write!(f, "bad frame length {frame_length}")
            }
            Self::BadNumberChannels { num_channels } => write!(
                f,
                "bad number of channels {num_channels}; expected 1..={MAX_CHANNELS}"
            ),
            Self::BadDataLength { expected, actual } => write!(
                f,
                "buffer holds {actual} samples, frame needs {expected}"
            ),
            Self::InvalidConfig(err) => write!(f, "invalid configuration: {err}"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::InvalidConfig(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfig(err)
    }
}
