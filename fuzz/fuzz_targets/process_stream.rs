#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use quell::{Config, DoubleTalkConfig, EchoCanceller, MAX_CHANNELS, SpectralConfig};

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    /// Filter length (clamped to 1-256)
    filter_length: u16,
    /// Frame length (clamped to 1-256)
    frame_length: u16,
    /// Number of channels passed to `process` (0 and >MAX are allowed)
    channels: u8,
    /// Channels the engine is built with (clamped to 1-MAX)
    configured_channels: u8,
    step_size: f32,
    use_fixed_point: bool,
    double_talk: bool,
    spectral: bool,
    /// Interleaved far/near samples, split in half
    samples: Vec<i16>,
}

fuzz_target!(|input: FuzzInput| {
    let filter_length = usize::from(input.filter_length % 256) + 1;
    let frame_length = usize::from(input.frame_length % 256) + 1;
    let configured = usize::from(input.configured_channels) % MAX_CHANNELS + 1;
    let channels = usize::from(input.channels % (MAX_CHANNELS as u8 + 2));

    let config = Config {
        filter_length,
        frame_size: frame_length,
        step_size: input.step_size,
        use_fixed_point: input.use_fixed_point,
        num_channels: configured,
        double_talk: input.double_talk.then(|| DoubleTalkConfig {
            spectral: input.spectral.then_some(SpectralConfig {
                fft_size: 64,
                num_bins: 8,
            }),
            ..Default::default()
        }),
        ..Default::default()
    };
    // Arbitrary step sizes are mostly invalid; that path must error cleanly.
    let Ok(mut aec) = EchoCanceller::new(config) else {
        return;
    };

    let half = input.samples.len() / 2;
    let (far, near) = input.samples.split_at(half);
    let mut output = vec![0i16; near.len()];
    let _ = aec.process(far, &near[..half], &mut output[..half], frame_length, channels);
    let _ = aec.process_in_place(far, &mut output[..half], frame_length, channels);

    let stats = aec.statistics();
    if let Some(erle) = stats.echo_return_loss_enhancement {
        assert!(!erle.is_nan());
    }
});
