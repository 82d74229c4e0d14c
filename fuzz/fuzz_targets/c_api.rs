#![no_main]

use std::ptr;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use quell_ffi::functions::*;
use quell_ffi::types::*;

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    channels: u8,
    fixed_point: bool,
    operations: Vec<FuzzOp>,
    samples: Vec<i16>,
}

#[derive(Debug, Arbitrary)]
enum FuzzOp {
    Process { frame_length: u8, channels: u8 },
    ProcessInPlace { frame_length: u8 },
    Reset,
    GetStatistics,
    GetConfig,
    ErleDb,
    LatencyMs,
}

const FRAME: usize = 80;

fuzz_target!(|input: FuzzInput| {
    let channels = usize::from(input.channels % 4) + 1;
    let total = FRAME * channels;
    if input.samples.len() < total * 2 {
        return;
    }

    let config = QuellConfig {
        frame_size: FRAME,
        filter_length: 64,
        num_channels: channels,
        use_fixed_point: input.fixed_point,
        ..quell_config_default()
    };
    let aec = quell_create(config);
    if aec.is_null() {
        return;
    }

    let far = &input.samples[..total];
    let near = &input.samples[total..total * 2];
    let mut out = vec![0i16; total];

    for op in input.operations.iter().take(64) {
        match *op {
            FuzzOp::Process {
                frame_length,
                channels: ch,
            } => {
                // Shapes that exceed the buffers are rejected before any read.
                let frame_length = usize::from(frame_length).min(FRAME);
                let ch = usize::from(ch % 10).min(channels);
                let err = quell_process(
                    aec,
                    far.as_ptr(),
                    near.as_ptr(),
                    out.as_mut_ptr(),
                    frame_length,
                    ch,
                );
                if frame_length > 0 && ch > 0 {
                    assert_eq!(err, QuellError::None);
                }
            }
            FuzzOp::ProcessInPlace { frame_length } => {
                let frame_length = usize::from(frame_length).clamp(1, FRAME);
                out.copy_from_slice(near);
                let err = quell_process(
                    aec,
                    far.as_ptr(),
                    out.as_ptr(),
                    out.as_mut_ptr(),
                    frame_length,
                    channels,
                );
                assert_eq!(err, QuellError::None);
            }
            FuzzOp::Reset => {
                assert_eq!(quell_reset(aec), QuellError::None);
            }
            FuzzOp::GetStatistics => {
                let mut stats = QuellStats::default();
                assert_eq!(quell_get_statistics(aec, &mut stats), QuellError::None);
            }
            FuzzOp::GetConfig => {
                let mut config = quell_config_default();
                assert_eq!(quell_get_config(aec, &mut config), QuellError::None);
                assert_eq!(config.num_channels, channels);
            }
            FuzzOp::ErleDb => {
                assert!(!quell_erle_db(aec).is_nan());
            }
            FuzzOp::LatencyMs => {
                assert!(quell_latency_ms(aec) >= 0.0);
            }
        }
    }

    quell_destroy(aec);
    quell_destroy(ptr::null_mut());
});
