//! Multichannel echo canceller engine.

use std::time::{Duration, Instant};

use quell_aec::DoubleTalkDetector;

use crate::channel::Channel;
use crate::config::{Config, MAX_CHANNELS};
use crate::erle_estimator::{ErleEstimator, FrameEnergy};
use crate::error::Error;
use crate::stats::Stats;

/// Acoustic echo canceller for interleaved 16-bit frames.
///
/// Owns one adaptive filter and, when enabled, one double-talk detector per
/// channel. Channels are processed independently; the engine never mixes
/// information across channels.
///
/// ```
/// use quell::{Config, EchoCanceller};
///
/// let mut aec = EchoCanceller::new(Config {
///     frame_size: 128,
///     filter_length: 256,
///     num_channels: 2,
///     ..Default::default()
/// })?;
///
/// let far = vec![1000i16; 256];
/// let mut frame = vec![2000i16; 256];
/// aec.process_in_place(&far, &mut frame, 128, 2)?;
/// assert!(aec.latency_ms() >= 0.0);
/// # Ok::<(), quell::Error>(())
/// ```
#[derive(Debug)]
pub struct EchoCanceller {
    config: Config,
    channels: Vec<Channel>,
    erle: ErleEstimator,
    samples_processed: u64,
    frames_processed: u64,
    processing_time: Duration,
}

impl EchoCanceller {
    /// Validates `config` and allocates one filter/detector pair per channel.
    pub fn new(config: Config) -> Result<Self, Error> {
        config.validate()?;
        if config.num_channels > MAX_CHANNELS {
            tracing::warn!(
                requested = config.num_channels,
                max = MAX_CHANNELS,
                "capping channel count"
            );
        }

        let channels = (0..config.effective_channels())
            .map(|_| Channel::new(&config))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            channels = channels.len(),
            filter_length = config.filter_length,
            frame_size = config.frame_size,
            fixed_point = config.use_fixed_point,
            double_talk = config.double_talk.is_some(),
            "echo canceller created"
        );

        Ok(Self {
            config,
            channels,
            erle: ErleEstimator::default(),
            samples_processed: 0,
            frames_processed: 0,
            processing_time: Duration::ZERO,
        })
    }

    /// Cancels echo in one interleaved frame.
    ///
    /// `far`, `near` and `output` hold `frame_length * num_channels`
    /// interleaved samples (longer buffers are fine; the tail is ignored).
    /// The first `min(num_channels, allocated channels)` channels are
    /// filtered; any further channels are copied from `near` unchanged.
    ///
    /// On error nothing is written and no state changes.
    pub fn process(
        &mut self,
        far: &[i16],
        near: &[i16],
        output: &mut [i16],
        frame_length: usize,
        num_channels: usize,
    ) -> Result<(), Error> {
        let len = Self::check_frame(frame_length, num_channels, &[far.len(), near.len(), output.len()])?;
        let output = &mut output[..len];
        output.copy_from_slice(&near[..len]);
        self.process_frame(&far[..len], output, frame_length, num_channels);
        Ok(())
    }

    /// Like [`process`](Self::process), but overwrites the near-end frame
    /// with the output.
    pub fn process_in_place(
        &mut self,
        far: &[i16],
        near_out: &mut [i16],
        frame_length: usize,
        num_channels: usize,
    ) -> Result<(), Error> {
        let len = Self::check_frame(frame_length, num_channels, &[far.len(), near_out.len()])?;
        self.process_frame(&far[..len], &mut near_out[..len], frame_length, num_channels);
        Ok(())
    }

    /// Returns the interleaved frame length after validating the call.
    fn check_frame(
        frame_length: usize,
        num_channels: usize,
        buffer_lengths: &[usize],
    ) -> Result<usize, Error> {
        if frame_length == 0 {
            return Err(Error::BadFrameLength { frame_length });
        }
        if num_channels == 0 || num_channels > MAX_CHANNELS {
            return Err(Error::BadNumberChannels { num_channels });
        }
        let expected = frame_length
            .checked_mul(num_channels)
            .ok_or(Error::BadFrameLength { frame_length })?;
        if let Some(&actual) = buffer_lengths.iter().find(|&&len| len < expected) {
            return Err(Error::BadDataLength { expected, actual });
        }
        Ok(expected)
    }

    fn process_frame(
        &mut self,
        far: &[i16],
        near_out: &mut [i16],
        frame_length: usize,
        num_channels: usize,
    ) {
        let start = Instant::now();

        let active = num_channels.min(self.channels.len());
        let mut energy = FrameEnergy::default();
        for (c, channel) in self.channels.iter_mut().take(active).enumerate() {
            energy += channel.process(&far[c..], &mut near_out[c..], frame_length, num_channels);
        }

        self.erle.update(energy);
        self.samples_processed += energy.samples as u64;
        self.frames_processed += 1;
        self.processing_time += start.elapsed();
    }

    /// Clears every filter, detector and metric. The configuration is kept.
    pub fn reset(&mut self) {
        for channel in &mut self.channels {
            channel.reset();
        }
        self.erle.clear();
        self.samples_processed = 0;
        self.frames_processed = 0;
        self.processing_time = Duration::ZERO;
        tracing::debug!(channels = self.channels.len(), "echo canceller reset");
    }

    /// Echo return loss enhancement in dB, smoothed over roughly the last
    /// ten frames. Returns `0.0` before the first frame.
    pub fn erle_db(&self) -> f64 {
        self.erle.erle_db().unwrap_or(0.0)
    }

    /// Mean wall-clock processing time per sample in milliseconds since
    /// creation or the last reset. Returns `0.0` before the first frame.
    pub fn latency_ms(&self) -> f64 {
        if self.samples_processed == 0 {
            return 0.0;
        }
        self.processing_time.as_secs_f64() * 1e3 / self.samples_processed as f64
    }

    /// Snapshot of all metrics.
    pub fn statistics(&self) -> Stats {
        let has_data = self.samples_processed > 0;
        Stats {
            echo_return_loss_enhancement: self.erle.erle_db(),
            latency_ms: has_data.then(|| self.latency_ms()),
            samples_processed: self.samples_processed,
            frames_processed: self.frames_processed,
            frozen_channels: self.channels.iter().filter(|c| !c.adapt_allowed()).count(),
        }
    }

    /// The configuration this engine was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of channels with their own filter.
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// L2 norm of a channel's filter weights, `None` for an unknown channel.
    pub fn coefficient_norm(&self, channel: usize) -> Option<f32> {
        self.channels.get(channel).map(Channel::coefficient_norm)
    }

    /// Whether a channel's filter adapted on the last frame, `None` for an
    /// unknown channel.
    pub fn adaptation_allowed(&self, channel: usize) -> Option<bool> {
        self.channels.get(channel).map(Channel::adapt_allowed)
    }

    /// A channel's double-talk detector, for diagnostics.
    pub fn double_talk(&self, channel: usize) -> Option<&DoubleTalkDetector> {
        self.channels.get(channel).and_then(Channel::detector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(config: Config) -> EchoCanceller {
        EchoCanceller::new(config).unwrap()
    }

    #[test]
    fn allocates_capped_channels() {
        let aec = engine(Config {
            num_channels: 12,
            frame_size: 32,
            filter_length: 64,
            ..Default::default()
        });
        assert_eq!(aec.num_channels(), MAX_CHANNELS);
    }

    #[test]
    fn metrics_are_zero_before_processing() {
        let aec = engine(Config::default());
        assert_eq!(aec.erle_db(), 0.0);
        assert_eq!(aec.latency_ms(), 0.0);
        let stats = aec.statistics();
        assert_eq!(stats.echo_return_loss_enhancement, None);
        assert_eq!(stats.latency_ms, None);
        assert_eq!(stats.samples_processed, 0);
    }

    #[test]
    fn zero_frame_length_is_rejected() {
        let mut aec = engine(Config::default());
        let mut out = [7i16; 4];
        assert_eq!(
            aec.process(&[0; 4], &[0; 4], &mut out, 0, 1),
            Err(Error::BadFrameLength { frame_length: 0 })
        );
        assert_eq!(out, [7; 4]);
    }

    #[test]
    fn bad_channel_counts_are_rejected() {
        let mut aec = engine(Config::default());
        let mut out = [0i16; 64];
        assert_eq!(
            aec.process(&[0; 64], &[0; 64], &mut out, 4, 0),
            Err(Error::BadNumberChannels { num_channels: 0 })
        );
        assert_eq!(
            aec.process(&[0; 64], &[0; 64], &mut out, 4, MAX_CHANNELS + 1),
            Err(Error::BadNumberChannels {
                num_channels: MAX_CHANNELS + 1
            })
        );
    }

    #[test]
    fn short_buffers_are_rejected_without_writing() {
        let mut aec = engine(Config::default());
        let mut out = [5i16; 8];
        assert_eq!(
            aec.process(&[0; 8], &[1; 7], &mut out, 4, 2),
            Err(Error::BadDataLength {
                expected: 8,
                actual: 7
            })
        );
        assert_eq!(out, [5; 8]);
        assert_eq!(aec.statistics().frames_processed, 0);
    }

    #[test]
    fn extra_requested_channels_pass_through() {
        let mut aec = engine(Config {
            num_channels: 1,
            frame_size: 16,
            filter_length: 32,
            double_talk: None,
            ..Default::default()
        });
        let far = vec![1000i16; 32];
        let near: Vec<i16> = (0..32).map(|i| if i % 2 == 0 { 2000 } else { 1234 }).collect();
        let mut out = vec![0i16; 32];
        for _ in 0..4 {
            aec.process(&far, &near, &mut out, 16, 2).unwrap();
        }
        assert!(out.iter().skip(1).step_by(2).all(|&s| s == 1234));
        assert!(out.iter().step_by(2).any(|&s| s != 2000));
        // Only the filtered channel counts towards the sample total.
        assert_eq!(aec.statistics().samples_processed, 4 * 16);
    }

    #[test]
    fn accessors_report_per_channel_state() {
        let aec = engine(Config {
            num_channels: 2,
            ..Default::default()
        });
        assert_eq!(aec.coefficient_norm(0), Some(0.0));
        assert_eq!(aec.coefficient_norm(2), None);
        assert_eq!(aec.adaptation_allowed(1), Some(true));
        assert!(aec.double_talk(0).is_some());
        assert!(aec.double_talk(5).is_none());
        assert_eq!(aec.config().num_channels, 2);
    }
}
