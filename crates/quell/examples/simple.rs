//! Minimal echo cancellation demo.
//!
//! Synthesizes a stereo far-end signal, simulates the microphone picking up
//! an attenuated copy of it, and shows the residual shrinking as the filters
//! adapt.
//!
//! ```sh
//! cargo run -p quell --example simple
//! ```

use quell::{Config, EchoCanceller};

const FRAME: usize = 160;
const CHANNELS: usize = 2;

fn main() {
    let config = Config {
        frame_size: FRAME,
        filter_length: 256,
        num_channels: CHANNELS,
        use_fixed_point: false,
        ..Default::default()
    };
    let mut aec = EchoCanceller::new(config).unwrap();

    let mut output = vec![0i16; FRAME * CHANNELS];
    for frame in 0..50 {
        let (far, near) = sample_stereo_frame(frame);
        aec.process(&far, &near, &mut output, FRAME, CHANNELS)
            .unwrap();

        if frame % 10 == 0 {
            println!(
                "frame {frame:2}: near rms {:7.1}  residual rms {:7.1}  erle {:5.1} dB",
                rms(&near),
                rms(&output),
                aec.erle_db()
            );
        }
    }

    println!(
        "processed {} samples, {:.6} ms per sample",
        aec.statistics().samples_processed,
        aec.latency_ms()
    );
}

/// Interleaved stereo far-end tone and its echo as picked up by the microphone.
fn sample_stereo_frame(frame: usize) -> (Vec<i16>, Vec<i16>) {
    let mut far = Vec::with_capacity(FRAME * CHANNELS);
    let mut near = Vec::with_capacity(FRAME * CHANNELS);
    for i in 0..FRAME {
        let t = (frame * FRAME + i) as f32;
        let left = (t / 8.0).sin() * 4000.0;
        let right = (t / 13.0).cos() * 2000.0;
        far.extend([left as i16, right as i16]);
        near.extend([(left * 0.3) as i16, (right * 0.3) as i16]);
    }
    (far, near)
}

fn rms(samples: &[i16]) -> f64 {
    let sum: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum / samples.len() as f64).sqrt()
}
