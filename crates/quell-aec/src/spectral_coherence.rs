//! Per-bin magnitude-squared coherence between far-end and near-end frames.
//!
//! The low `num_bins` bins of an `fft_size`-point DFT are evaluated directly
//! from a precomputed cosine/sine table. Auto spectra and the complex cross
//! spectrum `F * conj(N)` are exponentially smoothed per bin; the reported
//! coherence is the mean of `|S_fn|^2 / (S_ff * S_nn)` over bins that carry a
//! meaningful share of the energy.

use std::f64::consts::TAU;

use crate::config::SpectralConfig;
use crate::{POWER_EPSILON, S16_TO_UNIT};

/// Bins whose joint power is below this fraction of the strongest bin are
/// ignored.
const BIN_ENERGY_FLOOR: f32 = 1e-3;

#[derive(derive_more::Debug)]
pub(crate) struct SpectralCoherence {
    fft_size: usize,
    #[debug(skip)]
    cos_table: Vec<f32>,
    #[debug(skip)]
    sin_table: Vec<f32>,
    #[debug(skip)]
    far_power: Vec<f32>,
    #[debug(skip)]
    near_power: Vec<f32>,
    #[debug(skip)]
    cross_re: Vec<f32>,
    #[debug(skip)]
    cross_im: Vec<f32>,
}

impl SpectralCoherence {
    /// `config` must already be validated.
    pub(crate) fn new(config: &SpectralConfig) -> Self {
        let n = config.fft_size;
        let (cos_table, sin_table) = (0..n)
            .map(|i| {
                let phase = TAU * i as f64 / n as f64;
                (phase.cos() as f32, phase.sin() as f32)
            })
            .unzip();
        Self {
            fft_size: n,
            cos_table,
            sin_table,
            far_power: vec![0.0; config.num_bins],
            near_power: vec![0.0; config.num_bins],
            cross_re: vec![0.0; config.num_bins],
            cross_im: vec![0.0; config.num_bins],
        }
    }

    pub(crate) fn reset(&mut self) {
        self.far_power.fill(0.0);
        self.near_power.fill(0.0);
        self.cross_re.fill(0.0);
        self.cross_im.fill(0.0);
    }

    /// Folds one frame into the smoothed spectra and returns the averaged
    /// coherence, or `None` when no bin carries energy.
    ///
    /// At most `fft_size` samples of the frame are used.
    pub(crate) fn update(
        &mut self,
        far: &[i16],
        near: &[i16],
        frame_length: usize,
        stride: usize,
        alpha: f32,
    ) -> Option<f32> {
        let samples = frame_length.min(self.fft_size);
        let n = self.fft_size;

        for k in 0..self.far_power.len() {
            let (mut far_re, mut far_im) = (0.0f64, 0.0f64);
            let (mut near_re, mut near_im) = (0.0f64, 0.0f64);
            let frame = far.iter().step_by(stride).zip(near.iter().step_by(stride));
            for (i, (&f, &x)) in frame.take(samples).enumerate() {
                let t = (k * i) % n;
                let (c, s) = (f64::from(self.cos_table[t]), f64::from(self.sin_table[t]));
                let f = f64::from(f) * S16_TO_UNIT;
                let x = f64::from(x) * S16_TO_UNIT;
                // e^{-j theta} = cos - j sin
                far_re += f * c;
                far_im -= f * s;
                near_re += x * c;
                near_im -= x * s;
            }

            let far_inst = (far_re * far_re + far_im * far_im) as f32;
            let near_inst = (near_re * near_re + near_im * near_im) as f32;
            // F * conj(N)
            let cross_re_inst = (far_re * near_re + far_im * near_im) as f32;
            let cross_im_inst = (far_im * near_re - far_re * near_im) as f32;

            let beta = 1.0 - alpha;
            self.far_power[k] = alpha * self.far_power[k] + beta * far_inst;
            self.near_power[k] = alpha * self.near_power[k] + beta * near_inst;
            self.cross_re[k] = alpha * self.cross_re[k] + beta * cross_re_inst;
            self.cross_im[k] = alpha * self.cross_im[k] + beta * cross_im_inst;
        }

        let max_joint = self
            .far_power
            .iter()
            .zip(&self.near_power)
            .map(|(f, n)| f + n)
            .fold(0.0f32, f32::max);
        let floor = max_joint * BIN_ENERGY_FLOOR;

        let mut sum = 0.0f32;
        let mut count = 0usize;
        for k in 0..self.far_power.len() {
            let (sf, sn) = (self.far_power[k], self.near_power[k]);
            let auto = sf * sn;
            if sf + sn > floor && auto > 0.0 {
                let cross = self.cross_re[k] * self.cross_re[k] + self.cross_im[k] * self.cross_im[k];
                sum += cross / auto.max(POWER_EPSILON);
                count += 1;
            }
        }

        (count > 0).then(|| sum / count as f32)
    }
}
