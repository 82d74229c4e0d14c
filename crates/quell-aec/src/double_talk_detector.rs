//! Double-talk detection.
//!
//! Adaptation must stop while the near-end talker is active, otherwise the
//! filter learns local speech as echo and starts cancelling it. The detector
//! tracks exponentially smoothed far, near and cross powers and declares
//! double talk when the near-end is much louder than the far-end *and* the
//! two are poorly correlated. A hangover keeps adaptation frozen for a few
//! frames after the last detection.

use crate::config::{ConfigError, DoubleTalkConfig};
use crate::spectral_coherence::SpectralCoherence;
use crate::{POWER_EPSILON, S16_TO_UNIT};

/// Below this smoothed near-end power the near-end is treated as silent.
const MIN_NEAR_POWER: f32 = 1e-8;

/// Frame-level double-talk detector for one channel.
#[derive(Debug)]
pub struct DoubleTalkDetector {
    near_to_far_threshold: f32,
    coherence_threshold: f32,
    alpha: f32,
    hangover_frames: u32,

    far_power: f32,
    near_power: f32,
    cross_power: f32,
    hangover_counter: u32,
    adapt_allowed: bool,
    last_ratio: f32,
    last_coherence: f32,

    spectral: Option<SpectralCoherence>,
}

impl DoubleTalkDetector {
    /// Creates a detector with adaptation allowed and all estimates zeroed.
    pub fn new(config: &DoubleTalkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            near_to_far_threshold: config.near_to_far_threshold,
            coherence_threshold: config.coherence_threshold,
            alpha: config.smoothing_alpha,
            hangover_frames: config.hangover_frames,
            far_power: 0.0,
            near_power: 0.0,
            cross_power: 0.0,
            hangover_counter: 0,
            adapt_allowed: true,
            last_ratio: 0.0,
            last_coherence: 0.0,
            spectral: config.spectral.as_ref().map(SpectralCoherence::new),
        })
    }

    /// Analyses one frame and returns whether the filter may adapt.
    ///
    /// `far` and `near` are read from index 0 every `stride` samples, which
    /// lets the caller pass one channel of an interleaved buffer by offsetting
    /// the slices. A `stride` of 0 is treated as 1. When the slices hold fewer
    /// than `frame_length` strided samples only the available ones are used;
    /// an empty frame leaves the state untouched.
    pub fn update(
        &mut self,
        far: &[i16],
        near: &[i16],
        frame_length: usize,
        stride: usize,
    ) -> bool {
        let stride = stride.max(1);

        let mut far_energy = 0.0f64;
        let mut near_energy = 0.0f64;
        let mut cross_energy = 0.0f64;
        let mut count = 0usize;
        let frame = far.iter().step_by(stride).zip(near.iter().step_by(stride));
        for (&f, &n) in frame.take(frame_length) {
            let f = f64::from(f) * S16_TO_UNIT;
            let n = f64::from(n) * S16_TO_UNIT;
            far_energy += f * f;
            near_energy += n * n;
            cross_energy += f * n;
            count += 1;
        }
        if count == 0 {
            return self.adapt_allowed;
        }

        let inv = 1.0 / count as f64;
        let beta = 1.0 - self.alpha;
        self.far_power = self.alpha * self.far_power + beta * (far_energy * inv) as f32;
        self.near_power = self.alpha * self.near_power + beta * (near_energy * inv) as f32;
        self.cross_power = self.alpha * self.cross_power + beta * (cross_energy * inv) as f32;

        let ratio = self.near_power / (self.far_power + POWER_EPSILON);
        let broadband_coherence =
            self.cross_power * self.cross_power / (self.far_power * self.near_power).max(POWER_EPSILON);
        let coherence = self
            .spectral
            .as_mut()
            .and_then(|spectral| spectral.update(far, near, count, stride, self.alpha))
            .unwrap_or(broadband_coherence);

        self.last_ratio = ratio;
        self.last_coherence = coherence;

        let double_talk = self.near_power >= MIN_NEAR_POWER
            && ratio > self.near_to_far_threshold
            && coherence < self.coherence_threshold;

        if double_talk {
            if self.adapt_allowed {
                tracing::debug!(ratio, coherence, "double talk detected, freezing adaptation");
            }
            self.hangover_counter = self.hangover_frames;
            self.adapt_allowed = false;
        } else if self.hangover_counter > 0 {
            self.hangover_counter -= 1;
            self.adapt_allowed = self.hangover_counter == 0;
            if self.adapt_allowed {
                tracing::trace!(ratio, coherence, "hangover elapsed, resuming adaptation");
            }
        } else {
            self.adapt_allowed = true;
        }

        self.adapt_allowed
    }

    /// Restores the initial state: adaptation allowed, estimates zeroed.
    pub fn reset(&mut self) {
        self.far_power = 0.0;
        self.near_power = 0.0;
        self.cross_power = 0.0;
        self.hangover_counter = 0;
        self.adapt_allowed = true;
        self.last_ratio = 0.0;
        self.last_coherence = 0.0;
        if let Some(spectral) = &mut self.spectral {
            spectral.reset();
        }
    }

    /// Decision from the most recent [`update`](Self::update).
    pub fn adapt_allowed(&self) -> bool {
        self.adapt_allowed
    }

    /// Smoothed near/far power ratio from the most recent update.
    pub fn last_ratio(&self) -> f32 {
        self.last_ratio
    }

    /// Coherence from the most recent update, spectral when enabled.
    pub fn last_coherence(&self) -> f32 {
        self.last_coherence
    }

    /// Frames left before a hangover releases adaptation.
    pub fn hangover_remaining(&self) -> u32 {
        self.hangover_counter
    }

    /// Whether per-bin spectral coherence is in use.
    pub fn is_spectral(&self) -> bool {
        self.spectral.is_some()
    }
}
