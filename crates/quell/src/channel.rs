//! One filter/detector pair operating on a single channel of an
//! interleaved stream.

use quell_aec::{DoubleTalkDetector, FixedNlmsFilter, FloatNlmsFilter, NlmsFilter};
use quell_fixed::Q15;

use crate::audio_util::{float_to_s16_truncating, s16_to_float};
use crate::config::Config;
use crate::erle_estimator::FrameEnergy;
use crate::error::Error;

#[derive(Debug)]
enum ChannelFilter {
    Fixed(FixedNlmsFilter),
    Float(FloatNlmsFilter),
}

#[derive(Debug)]
pub(crate) struct Channel {
    filter: ChannelFilter,
    detector: Option<DoubleTalkDetector>,
}

impl Channel {
    pub(crate) fn new(config: &Config) -> Result<Self, Error> {
        let nlms = config.nlms();
        let filter = if config.use_fixed_point {
            ChannelFilter::Fixed(NlmsFilter::new(&nlms)?)
        } else {
            ChannelFilter::Float(NlmsFilter::new(&nlms)?)
        };
        let detector = config
            .double_talk
            .as_ref()
            .map(DoubleTalkDetector::new)
            .transpose()?;
        Ok(Self { filter, detector })
    }

    /// Cancels echo for one channel in place.
    ///
    /// `far` and `near_out` start at this channel's first sample; successive
    /// samples are `stride` apart. The caller guarantees both slices hold at
    /// least `frame_length` strided samples.
    pub(crate) fn process(
        &mut self,
        far: &[i16],
        near_out: &mut [i16],
        frame_length: usize,
        stride: usize,
    ) -> FrameEnergy {
        let adapt = match &mut self.detector {
            Some(detector) => detector.update(far, near_out, frame_length, stride),
            None => true,
        };

        let mut energy = FrameEnergy::default();
        let samples = far
            .iter()
            .step_by(stride)
            .zip(near_out.iter_mut().step_by(stride))
            .take(frame_length);

        match &mut self.filter {
            ChannelFilter::Fixed(filter) => {
                for (&x, y) in samples {
                    let near = *y;
                    let error = filter.process(Q15::from_raw(x), Q15::from_raw(near), adapt);
                    *y = error.raw();
                    energy.accumulate(near, *y);
                }
            }
            ChannelFilter::Float(filter) => {
                for (&x, y) in samples {
                    let near = *y;
                    let error = filter.process(s16_to_float(x), s16_to_float(near), adapt);
                    *y = float_to_s16_truncating(error);
                    energy.accumulate(near, *y);
                }
            }
        }

        energy
    }

    pub(crate) fn reset(&mut self) {
        match &mut self.filter {
            ChannelFilter::Fixed(filter) => filter.reset(),
            ChannelFilter::Float(filter) => filter.reset(),
        }
        if let Some(detector) = &mut self.detector {
            detector.reset();
        }
    }

    pub(crate) fn coefficient_norm(&self) -> f32 {
        match &self.filter {
            ChannelFilter::Fixed(filter) => filter.coefficient_norm(),
            ChannelFilter::Float(filter) => filter.coefficient_norm(),
        }
    }

    pub(crate) fn adapt_allowed(&self) -> bool {
        self.detector
            .as_ref()
            .is_none_or(DoubleTalkDetector::adapt_allowed)
    }

    pub(crate) fn detector(&self) -> Option<&DoubleTalkDetector> {
        self.detector.as_ref()
    }
}
