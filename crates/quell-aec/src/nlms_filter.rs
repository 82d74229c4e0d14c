//! Normalized least-mean-squares adaptive FIR filter.
//!
//! The filter keeps the last `L` far-end samples in a circular delay line.
//! For every sample it predicts the echo `y = w . x`, returns the residual
//! `e = near - y` and, when allowed, moves the weights along
//! `(mu / (delta + |x|^2)) * e * x`.
//!
//! Two numeric paths share the same structure:
//!
//! - [`NlmsFilter<f32>`] works on real-valued samples in `[-1, 1)`.
//! - [`NlmsFilter<Q15>`] works on saturating Q15 samples. The dot product is
//!   accumulated wide and shifted down once, while the normalized step is
//!   computed in floating point and converted back to Q15 before the update.

use quell_fixed::{Q15, Q15_SHIFT};

use crate::config::{ConfigError, NlmsConfig};

/// Floating-point NLMS filter.
pub type FloatNlmsFilter = NlmsFilter<f32>;

/// Fixed-point NLMS filter.
pub type FixedNlmsFilter = NlmsFilter<Q15>;

/// Squared Q15 scale, converts a raw power accumulator back to a real value.
const Q15_POWER_SCALE: f64 = 32768.0 * 32768.0;

/// NLMS adaptive filter over samples of type `T` (`f32` or [`Q15`]).
#[derive(derive_more::Debug, Clone)]
pub struct NlmsFilter<T> {
    step_size: f32,
    regularization: f32,
    /// Slot where the next far-end sample is written. Always `< len()`.
    index: usize,
    #[debug(skip)]
    weights: Vec<T>,
    #[debug(skip)]
    delay_line: Vec<T>,
}

impl<T: Copy + Default> NlmsFilter<T> {
    /// Creates a filter with all weights and history zeroed.
    pub fn new(config: &NlmsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            step_size: config.step_size,
            regularization: config.regularization,
            index: 0,
            weights: vec![T::default(); config.filter_length],
            delay_line: vec![T::default(); config.filter_length],
        })
    }

    /// Zeroes weights and history without reallocating.
    pub fn reset(&mut self) {
        self.weights.fill(T::default());
        self.delay_line.fill(T::default());
        self.index = 0;
    }

    /// Number of taps.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// Always `false`; a filter has at least one tap.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Current weights. Tap 0 weights the newest far-end sample and tap
    /// `i > 0` the sample written `L - i` calls earlier.
    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    /// Adaptation step size `mu`.
    pub fn step_size(&self) -> f32 {
        self.step_size
    }

    /// Regularization `delta`.
    pub fn regularization(&self) -> f32 {
        self.regularization
    }

    /// Delay line samples in weight order.
    #[inline]
    fn taps(&self) -> impl Iterator<Item = &T> {
        let (wrapped, current) = self.delay_line.split_at(self.index);
        current.iter().chain(wrapped)
    }

    #[inline]
    fn advance(&mut self) {
        self.index += 1;
        if self.index == self.delay_line.len() {
            self.index = 0;
        }
    }
}

impl NlmsFilter<f32> {
    /// Filters one sample and returns the echo-cancelled residual.
    ///
    /// Costs `O(L)` and never allocates.
    pub fn process(&mut self, far: f32, near: f32, adapt: bool) -> f32 {
        self.delay_line[self.index] = far;

        let estimate: f32 = self.taps().zip(&self.weights).map(|(x, w)| x * w).sum();
        let error = near - estimate;

        if adapt {
            let power = self.regularization + self.delay_line.iter().map(|x| x * x).sum::<f32>();
            let step = self.step_size / power;
            let (wrapped, current) = self.delay_line.split_at(self.index);
            for (w, x) in self.weights.iter_mut().zip(current.iter().chain(wrapped)) {
                *w += step * error * x;
            }
        }

        self.advance();
        error
    }

    /// L2 norm of the weight vector.
    pub fn coefficient_norm(&self) -> f32 {
        self.weights.iter().map(|w| w * w).sum::<f32>().sqrt()
    }
}

impl NlmsFilter<Q15> {
    /// Filters one sample and returns the echo-cancelled residual.
    ///
    /// The estimate is accumulated in 64 bits, shifted right by 15 and
    /// saturated. Every weight update goes through saturating Q15 arithmetic,
    /// so no intermediate can wrap around.
    pub fn process(&mut self, far: Q15, near: Q15, adapt: bool) -> Q15 {
        self.delay_line[self.index] = far;

        let acc: i64 = self
            .taps()
            .zip(&self.weights)
            .map(|(x, w)| i64::from(x.raw()) * i64::from(w.raw()))
            .sum();
        let estimate = Q15::from_raw(Q15::saturate_wide(acc >> Q15_SHIFT));
        let error = near.saturating_sub(estimate);

        if adapt {
            let step = Q15::from_f32(self.step_size / self.input_power());
            let (wrapped, current) = self.delay_line.split_at(self.index);
            for (w, &x) in self.weights.iter_mut().zip(current.iter().chain(wrapped)) {
                *w = w.saturating_add(x.saturating_mul(error).saturating_mul(step));
            }
        }

        self.advance();
        error
    }

    /// `delta + sum(x^2)` over the delay line, as a real value.
    ///
    /// Squares are accumulated in Q15 units on top of `delta` scaled by
    /// `2^30`, and the total is divided by `2^30`. The result feeds the
    /// floating-point step computation unchanged.
    fn input_power(&self) -> f32 {
        let bias = (f64::from(self.regularization) * Q15_POWER_SCALE) as i64;
        let acc = self
            .delay_line
            .iter()
            .map(|x| {
                let x = i64::from(x.raw());
                (x * x) >> Q15_SHIFT
            })
            .fold(bias, |acc, sq| acc + sq);
        (acc as f64 / Q15_POWER_SCALE) as f32
    }

    /// L2 norm of the weight vector in real units.
    pub fn coefficient_norm(&self) -> f32 {
        self.weights
            .iter()
            .map(|w| {
                let w = w.to_f32();
                w * w
            })
            .sum::<f32>()
            .sqrt()
    }
}
