//! Echo return loss enhancement estimation.
//!
//! ERLE compares the power entering the canceller on the near-end path with
//! the power left in its output, `10 log10(P_near / P_out)`. Both powers are
//! per-sample frame means, exponentially smoothed over roughly the last ten
//! frames.

use std::ops::AddAssign;

/// Weight of the newest frame in the smoothed powers.
const ALPHA: f64 = 0.1;

/// Power floor in S16 units squared, keeps silent frames at 0 dB.
const POWER_FLOOR: f64 = 1.0;

/// Summed squares of one frame before and after cancellation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct FrameEnergy {
    pub near: f64,
    pub error: f64,
    pub samples: usize,
}

impl FrameEnergy {
    #[inline]
    pub(crate) fn accumulate(&mut self, near: i16, error: i16) {
        let near = f64::from(near);
        let error = f64::from(error);
        self.near += near * near;
        self.error += error * error;
        self.samples += 1;
    }
}

impl AddAssign for FrameEnergy {
    fn add_assign(&mut self, other: Self) {
        self.near += other.near;
        self.error += other.error;
        self.samples += other.samples;
    }
}

#[derive(Debug, Default)]
pub(crate) struct ErleEstimator {
    near_power: f64,
    error_power: f64,
    frames: u64,
}

impl ErleEstimator {
    pub(crate) fn update(&mut self, energy: FrameEnergy) {
        if energy.samples == 0 {
            return;
        }
        let n = energy.samples as f64;
        let near = energy.near / n;
        let error = energy.error / n;
        if self.frames == 0 {
            self.near_power = near;
            self.error_power = error;
        } else {
            self.near_power += ALPHA * (near - self.near_power);
            self.error_power += ALPHA * (error - self.error_power);
        }
        self.frames += 1;
        debug_assert!(self.near_power.is_finite());
        debug_assert!(self.error_power.is_finite());
    }

    /// ERLE in dB, `None` before the first frame.
    pub(crate) fn erle_db(&self) -> Option<f64> {
        (self.frames > 0).then(|| {
            10.0 * ((self.near_power + POWER_FLOOR) / (self.error_power + POWER_FLOOR)).log10()
        })
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
