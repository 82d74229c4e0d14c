//! Deterministic signals and proptest strategies for audio frames.

use std::f64::consts::TAU;

use proptest::prelude::*;
use test_strategy::Arbitrary;

/// Largest channel count the generators produce.
pub const MAX_TEST_CHANNELS: usize = 8;

/// Sine tone truncated to `i16`, starting at sample index `start`.
///
/// Passing `start = frame * len` yields phase-continuous consecutive frames.
pub fn tone_i16(
    len: usize,
    amplitude: f64,
    frequency_hz: f64,
    sample_rate_hz: u32,
    start: usize,
) -> Vec<i16> {
    let rate = f64::from(sample_rate_hz);
    (start..start + len)
        .map(|n| (amplitude * (TAU * frequency_hz * n as f64 / rate).sin()) as i16)
        .collect()
}

/// Uniform white noise in `[-amplitude, amplitude]` from a xorshift generator.
pub fn noise_f32(seed: u64, amplitude: f32, len: usize) -> Vec<f32> {
    let mut state = seed.max(1);
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let unit = (state >> 40) as f32 / (1u64 << 24) as f32;
            (unit * 2.0 - 1.0) * amplitude
        })
        .collect()
}

/// White noise scaled to `i16` with peak `amplitude`.
pub fn noise_i16(seed: u64, amplitude: i16, len: usize) -> Vec<i16> {
    noise_f32(seed, f32::from(amplitude), len)
        .into_iter()
        .map(|s| s as i16)
        .collect()
}

/// Interleaves equally long channels into one buffer.
pub fn interleave(channels: &[&[i16]]) -> Vec<i16> {
    let Some(first) = channels.first() else {
        return Vec::new();
    };
    let frames = first.len();
    assert!(
        channels.iter().all(|c| c.len() == frames),
        "channels must have equal length"
    );
    let mut out = Vec::with_capacity(frames * channels.len());
    for i in 0..frames {
        out.extend(channels.iter().map(|c| c[i]));
    }
    out
}

/// Extracts channel `channel` from an interleaved buffer.
pub fn deinterleave(samples: &[i16], num_channels: usize, channel: usize) -> Vec<i16> {
    samples
        .iter()
        .skip(channel)
        .step_by(num_channels)
        .copied()
        .collect()
}

/// A mono `i16` frame of exactly `len` samples.
pub fn frame_i16(len: usize) -> impl Strategy<Value = Vec<i16>> {
    proptest::collection::vec(i16::MIN..=i16::MAX, len..=len)
}

/// Interleaved multi-channel `i16` frame.
pub fn frame_multichannel_i16(
    frame_length: usize,
    num_channels: usize,
) -> impl Strategy<Value = Vec<i16>> {
    let len = frame_length * num_channels;
    proptest::collection::vec(i16::MIN..=i16::MAX, len..=len)
}

/// A far/near pair of interleaved frames with matching shape.
#[derive(Debug, Clone, Arbitrary)]
pub struct FramePair {
    #[strategy(1..=MAX_TEST_CHANNELS)]
    pub num_channels: usize,
    #[strategy(1..=160usize)]
    pub frame_length: usize,
    #[strategy(frame_multichannel_i16(#frame_length, #num_channels))]
    pub far: Vec<i16>,
    #[strategy(frame_multichannel_i16(#frame_length, #num_channels))]
    pub near: Vec<i16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_strategy::proptest;

    #[test]
    fn tone_is_phase_continuous() {
        let whole = tone_i16(512, 3000.0, 440.0, 16000, 0);
        let second = tone_i16(256, 3000.0, 440.0, 16000, 256);
        assert_eq!(&whole[256..], second.as_slice());
    }

    #[test]
    fn noise_is_deterministic_and_bounded() {
        let a = noise_f32(42, 0.5, 1000);
        let b = noise_f32(42, 0.5, 1000);
        assert_eq!(a, b);
        assert!(a.iter().all(|s| (-0.5..=0.5).contains(s)));
        assert_ne!(a, noise_f32(43, 0.5, 1000));
    }

    #[test]
    fn interleave_then_deinterleave() {
        let left = [1i16, 2, 3];
        let right = [-1i16, -2, -3];
        let mixed = interleave(&[&left, &right]);
        assert_eq!(mixed, vec![1, -1, 2, -2, 3, -3]);
        assert_eq!(deinterleave(&mixed, 2, 1), right.to_vec());
    }

    #[proptest]
    fn frame_has_requested_length(#[strategy(frame_i16(256))] frame: Vec<i16>) {
        assert_eq!(frame.len(), 256);
    }

    #[proptest]
    fn frame_pair_shapes_match(pair: FramePair) {
        let expected = pair.frame_length * pair.num_channels;
        assert_eq!(pair.far.len(), expected);
        assert_eq!(pair.near.len(), expected);
    }
}
