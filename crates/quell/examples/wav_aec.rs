//! Cancel far-end echo from a near-end WAV recording.
//!
//! Both inputs must be 16-bit PCM with the same sample rate and channel
//! count. The output has the length of the shorter input, truncated to whole
//! frames.
//!
//! ```sh
//! RUST_LOG=quell=debug cargo run -p quell --features examples --example wav_aec -- \
//!     far.wav near.wav out.wav --frame-size 160 --filter-length 512
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail, ensure};
use clap::Parser;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing_subscriber::EnvFilter;

use quell::{Config, DoubleTalkConfig, EchoCanceller, MAX_CHANNELS, SpectralConfig};

#[derive(Parser, Debug)]
#[command(about = "Remove loudspeaker echo from a microphone recording")]
struct Args {
    /// Far-end (loudspeaker) WAV file.
    far: PathBuf,

    /// Near-end (microphone) WAV file.
    near: PathBuf,

    /// Output WAV file.
    output: PathBuf,

    /// Samples per channel in each processed frame.
    #[arg(long, default_value_t = 128)]
    frame_size: usize,

    /// Adaptive filter taps per channel.
    #[arg(long, default_value_t = 256)]
    filter_length: usize,

    /// Use the Q15 fixed-point filter path.
    #[arg(long)]
    fixed: bool,

    /// Disable double-talk detection.
    #[arg(long)]
    no_double_talk: bool,

    /// Use spectral coherence for double-talk detection.
    #[arg(long, conflicts_with = "no_double_talk")]
    spectral: bool,
}

fn read_pcm16(path: &PathBuf) -> Result<(WavSpec, Vec<i16>)> {
    let reader =
        WavReader::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let spec = reader.spec();
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        bail!("{} is not 16-bit PCM", path.display());
    }
    let samples = reader
        .into_samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("failed to decode {}", path.display()))?;
    Ok((spec, samples))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let (far_spec, far) = read_pcm16(&args.far)?;
    let (near_spec, near) = read_pcm16(&args.near)?;
    ensure!(
        far_spec.channels == near_spec.channels,
        "channel count mismatch: far has {}, near has {}",
        far_spec.channels,
        near_spec.channels
    );
    ensure!(
        far_spec.sample_rate == near_spec.sample_rate,
        "sample rate mismatch: far is {} Hz, near is {} Hz",
        far_spec.sample_rate,
        near_spec.sample_rate
    );

    let channels = usize::from(near_spec.channels);
    ensure!(
        (1..=MAX_CHANNELS).contains(&channels),
        "unsupported channel count {channels}"
    );

    let double_talk = (!args.no_double_talk).then(|| DoubleTalkConfig {
        spectral: args.spectral.then(SpectralConfig::default),
        ..Default::default()
    });
    let config = Config {
        sample_rate_hz: near_spec.sample_rate,
        frame_size: args.frame_size,
        filter_length: args.filter_length,
        use_fixed_point: args.fixed,
        num_channels: channels,
        double_talk,
        ..Default::default()
    };
    let mut aec = EchoCanceller::new(config).context("invalid echo canceller settings")?;

    let mut writer = WavWriter::create(&args.output, near_spec)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let block = args.frame_size * channels;
    let mut out = vec![0i16; block];
    let mut frames = 0usize;
    for (far_block, near_block) in far.chunks_exact(block).zip(near.chunks_exact(block)) {
        aec.process(far_block, near_block, &mut out, args.frame_size, channels)?;
        for &sample in &out {
            writer.write_sample(sample)?;
        }
        frames += 1;
    }
    writer.finalize()?;

    let stats = aec.statistics();
    println!(
        "{frames} frames, ERLE {:.1} dB, {:.4} ms per sample, {} of {channels} channel(s) frozen at end",
        aec.erle_db(),
        aec.latency_ms(),
        stats.frozen_channels,
    );
    Ok(())
}
