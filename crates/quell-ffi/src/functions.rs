//! Exported `extern "C"` functions for the echo canceller C API.
//!
//! # Symbol prefix
//!
//! All public symbols use the `quell_` prefix.

use std::ffi::c_char;
use std::{ptr, slice};

use quell::{Config, EchoCanceller, MAX_CHANNELS};

use crate::panic_guard::{ffi_guard, ffi_guard_or, ffi_guard_ptr};
use crate::types::{QuellConfig, QuellEchoCanceller, QuellError, QuellStats};

// ─── Version ─────────────────────────────────────────────────────────

/// Returns a pointer to a static null-terminated version string.
///
/// The returned pointer is valid for the lifetime of the process.
#[unsafe(no_mangle)]
pub extern "C" fn quell_version() -> *const c_char {
    c"0.1.0".as_ptr()
}

// ─── Lifecycle ───────────────────────────────────────────────────────

/// Returns a default-initialized configuration.
#[unsafe(no_mangle)]
pub extern "C" fn quell_config_default() -> QuellConfig {
    QuellConfig::from_rust(&Config::default())
}

/// Creates a new echo canceller with the given configuration.
///
/// Returns `NULL` if the configuration is invalid or on internal error.
/// The caller owns the returned pointer and must free it with
/// [`quell_destroy()`].
#[unsafe(no_mangle)]
pub extern "C" fn quell_create(config: QuellConfig) -> *mut QuellEchoCanceller {
    ffi_guard_ptr! {
        match EchoCanceller::new(config.to_rust()) {
            Ok(inner) => Box::into_raw(Box::new(QuellEchoCanceller { inner })),
            Err(_) => ptr::null_mut(),
        }
    }
}

/// Validates a configuration without creating an instance.
#[unsafe(no_mangle)]
pub extern "C" fn quell_config_validate(config: QuellConfig) -> QuellError {
    ffi_guard! {
        match config.to_rust().validate() {
            Ok(()) => QuellError::None,
            Err(e) => e.into(),
        }
    }
}

/// Destroys an echo canceller and frees its memory.
///
/// Passing `NULL` is a safe no-op. After this call the pointer is invalid.
#[unsafe(no_mangle)]
pub extern "C" fn quell_destroy(aec: *mut QuellEchoCanceller) {
    if !aec.is_null() {
        // Safety: we created this pointer via Box::into_raw in quell_create,
        // and the caller guarantees single ownership.
        let _ = unsafe { Box::from_raw(aec) };
    }
}

/// Retrieves the configuration the instance was created with.
///
/// Returns `QuellError::NullPointer` if `aec` or `config_out` is null.
#[unsafe(no_mangle)]
pub extern "C" fn quell_get_config(
    aec: *const QuellEchoCanceller,
    config_out: *mut QuellConfig,
) -> QuellError {
    ffi_guard! {
        if aec.is_null() || config_out.is_null() {
            return QuellError::NullPointer;
        }
        // Safety: the caller guarantees the pointers are valid.
        let aec = unsafe { &*aec };
        let c_config = QuellConfig::from_rust(aec.inner.config());
        unsafe { ptr::write(config_out, c_config) };
        QuellError::None
    }
}

// ─── Processing ──────────────────────────────────────────────────────

/// Processes one interleaved frame.
///
/// `far`, `near` and `output` each hold `frame_length * num_channels`
/// samples. `output` may be the same pointer as `near` to process in
/// place; any other overlap with the inputs is rejected with
/// `QuellError::BadArgument`.
#[unsafe(no_mangle)]
pub extern "C" fn quell_process(
    aec: *mut QuellEchoCanceller,
    far: *const i16,
    near: *const i16,
    output: *mut i16,
    frame_length: usize,
    num_channels: usize,
) -> QuellError {
    ffi_guard! {
        if aec.is_null() || far.is_null() || near.is_null() || output.is_null() {
            return QuellError::NullPointer;
        }
        if frame_length == 0 {
            return QuellError::BadFrameLength;
        }
        if num_channels == 0 || num_channels > MAX_CHANNELS {
            return QuellError::BadNumberChannels;
        }
        let Some(len) = frame_length.checked_mul(num_channels) else {
            return QuellError::BadFrameLength;
        };

        // Safety: the caller guarantees the handle is valid and not aliased.
        let aec = unsafe { &mut *aec };
        // Safety: the caller guarantees `far` points to `len` readable samples.
        let far_slice = unsafe { slice::from_raw_parts(far, len) };

        let result = if ptr::eq(near, output.cast_const()) {
            if overlaps(far, near, len) {
                return QuellError::BadArgument;
            }
            // Safety: `near == output`, the caller guarantees `len` writable
            // samples, and `far` was checked to be disjoint from them.
            let near_out = unsafe { slice::from_raw_parts_mut(output, len) };
            aec.inner.process_in_place(far_slice, near_out, frame_length, num_channels)
        } else {
            if overlaps(output.cast_const(), near, len) || overlaps(output.cast_const(), far, len) {
                return QuellError::BadArgument;
            }
            // Safety: the caller guarantees both buffers hold `len` samples,
            // and `output` was checked to be disjoint from both inputs.
            let near_slice = unsafe { slice::from_raw_parts(near, len) };
            let out_slice = unsafe { slice::from_raw_parts_mut(output, len) };
            aec.inner.process(far_slice, near_slice, out_slice, frame_length, num_channels)
        };
        match result {
            Ok(()) => QuellError::None,
            Err(e) => e.into(),
        }
    }
}

/// Returns true if the `len`-sample buffers at `a` and `b` share memory.
fn overlaps(a: *const i16, b: *const i16, len: usize) -> bool {
    let bytes = len * size_of::<i16>();
    let a = a as usize;
    let b = b as usize;
    a < b.saturating_add(bytes) && b < a.saturating_add(bytes)
}

/// Clears all adaptive state. The configuration is kept.
///
/// Returns `QuellError::NullPointer` if `aec` is null.
#[unsafe(no_mangle)]
pub extern "C" fn quell_reset(aec: *mut QuellEchoCanceller) -> QuellError {
    ffi_guard! {
        if aec.is_null() {
            return QuellError::NullPointer;
        }
        // Safety: the caller guarantees the pointer is valid and not aliased.
        let aec = unsafe { &mut *aec };
        aec.inner.reset();
        QuellError::None
    }
}

// ─── Statistics ──────────────────────────────────────────────────────

/// Returns the current ERLE estimate in dB, or `0.0` for a null handle.
#[unsafe(no_mangle)]
pub extern "C" fn quell_erle_db(aec: *const QuellEchoCanceller) -> f64 {
    ffi_guard_or! { 0.0,
        if aec.is_null() {
            return 0.0;
        }
        // Safety: the caller guarantees the pointer is valid.
        let aec = unsafe { &*aec };
        aec.inner.erle_db()
    }
}

/// Returns the mean processing time per frame in milliseconds, or `0.0`
/// for a null handle.
#[unsafe(no_mangle)]
pub extern "C" fn quell_latency_ms(aec: *const QuellEchoCanceller) -> f64 {
    ffi_guard_or! { 0.0,
        if aec.is_null() {
            return 0.0;
        }
        // Safety: the caller guarantees the pointer is valid.
        let aec = unsafe { &*aec };
        aec.inner.latency_ms()
    }
}

/// Retrieves the current statistics.
///
/// Returns `QuellError::NullPointer` if `aec` or `stats_out` is null.
#[unsafe(no_mangle)]
pub extern "C" fn quell_get_statistics(
    aec: *const QuellEchoCanceller,
    stats_out: *mut QuellStats,
) -> QuellError {
    ffi_guard! {
        if aec.is_null() || stats_out.is_null() {
            return QuellError::NullPointer;
        }
        // Safety: the caller guarantees the pointers are valid.
        let aec = unsafe { &*aec };
        let stats = QuellStats::from(&aec.inner.statistics());
        unsafe { ptr::write(stats_out, stats) };
        QuellError::None
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::QuellAlgorithm;

    const FRAME: usize = 160;

    fn small_config() -> QuellConfig {
        QuellConfig {
            filter_length: 64,
            frame_size: FRAME,
            use_fixed_point: false,
            ..quell_config_default()
        }
    }

    fn echo_frames(num_channels: usize) -> (Vec<i16>, Vec<i16>) {
        let far: Vec<i16> = (0..FRAME * num_channels)
            .map(|i| (((i / num_channels) as f64 * 0.07).sin() * 1000.0) as i16)
            .collect();
        let near = far.iter().map(|&s| s / 2).collect();
        (far, near)
    }

    #[test]
    fn version_returns_non_null() {
        let ptr = quell_version();
        assert!(!ptr.is_null());
        // Safety: quell_version returns a static NUL-terminated string.
        let cstr = unsafe { std::ffi::CStr::from_ptr(ptr) };
        assert_eq!(cstr.to_str().unwrap(), "0.1.0");
    }

    #[test]
    fn config_default_matches_rust_default() {
        let c = quell_config_default();
        let rust = Config::default();
        assert_eq!(c.algorithm, QuellAlgorithm::Nlms);
        assert_eq!(c.sample_rate_hz, rust.sample_rate_hz);
        assert_eq!(c.frame_size, rust.frame_size);
        assert_eq!(c.filter_length, rust.filter_length);
        assert_eq!(c.use_fixed_point, rust.use_fixed_point);
        assert_eq!(c.num_channels, 1);
        assert!(c.double_talk_enabled);
        assert!(!c.spectral_enabled);
    }

    #[test]
    fn create_and_destroy() {
        let aec = quell_create(quell_config_default());
        assert!(!aec.is_null());
        quell_destroy(aec);
    }

    #[test]
    fn create_with_invalid_config_returns_null() {
        let config = QuellConfig {
            filter_length: 0,
            ..quell_config_default()
        };
        assert!(quell_create(config).is_null());
        assert_eq!(quell_config_validate(config), QuellError::InvalidConfig);

        let config = QuellConfig {
            algorithm: QuellAlgorithm::Rls,
            ..quell_config_default()
        };
        assert!(quell_create(config).is_null());
        assert_eq!(
            quell_config_validate(config),
            QuellError::UnsupportedAlgorithm
        );
    }

    #[test]
    fn destroy_null_is_safe() {
        quell_destroy(ptr::null_mut());
    }

    #[test]
    fn get_config_roundtrip() {
        let config = QuellConfig {
            num_channels: 2,
            spectral_enabled: true,
            fft_size: 256,
            num_bins: 16,
            ..small_config()
        };
        let aec = quell_create(config);
        let mut out = quell_config_default();
        assert_eq!(quell_get_config(aec, &mut out), QuellError::None);
        assert_eq!(out.num_channels, 2);
        assert_eq!(out.filter_length, 64);
        assert!(out.spectral_enabled);
        assert_eq!(out.fft_size, 256);
        assert_eq!(out.num_bins, 16);
        quell_destroy(aec);
    }

    #[test]
    fn null_handles_return_errors() {
        let (far, near) = echo_frames(1);
        let mut out = vec![0i16; FRAME];
        let mut stats = QuellStats::default();
        let mut config = quell_config_default();

        assert_eq!(
            quell_process(
                ptr::null_mut(),
                far.as_ptr(),
                near.as_ptr(),
                out.as_mut_ptr(),
                FRAME,
                1
            ),
            QuellError::NullPointer
        );
        assert_eq!(quell_reset(ptr::null_mut()), QuellError::NullPointer);
        assert_eq!(
            quell_get_statistics(ptr::null(), &mut stats),
            QuellError::NullPointer
        );
        assert_eq!(
            quell_get_config(ptr::null(), &mut config),
            QuellError::NullPointer
        );
        assert_eq!(quell_erle_db(ptr::null()), 0.0);
        assert_eq!(quell_latency_ms(ptr::null()), 0.0);
    }

    #[test]
    fn null_buffers_return_null_pointer() {
        let aec = quell_create(small_config());
        let (far, near) = echo_frames(1);
        let mut out = vec![0i16; FRAME];
        let err = quell_process(aec, ptr::null(), near.as_ptr(), out.as_mut_ptr(), FRAME, 1);
        assert_eq!(err, QuellError::NullPointer);
        let err = quell_process(aec, far.as_ptr(), near.as_ptr(), ptr::null_mut(), FRAME, 1);
        assert_eq!(err, QuellError::NullPointer);
        quell_destroy(aec);
    }

    #[test]
    fn process_rejects_bad_shapes() {
        let aec = quell_create(small_config());
        let (far, near) = echo_frames(1);
        let mut out = vec![0i16; FRAME];
        let err = quell_process(aec, far.as_ptr(), near.as_ptr(), out.as_mut_ptr(), 0, 1);
        assert_eq!(err, QuellError::BadFrameLength);
        let err = quell_process(aec, far.as_ptr(), near.as_ptr(), out.as_mut_ptr(), FRAME, 0);
        assert_eq!(err, QuellError::BadNumberChannels);
        let err = quell_process(
            aec,
            far.as_ptr(),
            near.as_ptr(),
            out.as_mut_ptr(),
            1,
            MAX_CHANNELS + 1,
        );
        assert_eq!(err, QuellError::BadNumberChannels);
        quell_destroy(aec);
    }

    #[test]
    fn process_reduces_echo() {
        let aec = quell_create(small_config());
        let (far, near) = echo_frames(1);
        let mut out = vec![0i16; FRAME];
        for _ in 0..50 {
            let err = quell_process(aec, far.as_ptr(), near.as_ptr(), out.as_mut_ptr(), FRAME, 1);
            assert_eq!(err, QuellError::None);
        }
        let residual: i32 = out.iter().map(|&s| i32::from(s).abs()).sum();
        let echo: i32 = near.iter().map(|&s| i32::from(s).abs()).sum();
        assert!(residual < echo / 10, "residual {residual} vs echo {echo}");
        assert!(quell_erle_db(aec) > 0.0);

        let mut stats = QuellStats::default();
        assert_eq!(quell_get_statistics(aec, &mut stats), QuellError::None);
        assert!(stats.has_erle_db);
        assert_eq!(stats.frames_processed, 50);
        assert_eq!(stats.samples_processed, 50 * FRAME as u64);
        quell_destroy(aec);
    }

    #[test]
    fn in_place_matches_separate_buffers() {
        let config = QuellConfig {
            num_channels: 2,
            ..small_config()
        };
        let separate = quell_create(config);
        let in_place = quell_create(config);
        let (far, near) = echo_frames(2);

        for _ in 0..5 {
            let mut out = vec![0i16; FRAME * 2];
            let err = quell_process(
                separate,
                far.as_ptr(),
                near.as_ptr(),
                out.as_mut_ptr(),
                FRAME,
                2,
            );
            assert_eq!(err, QuellError::None);

            let mut buf = near.clone();
            let err = quell_process(
                in_place,
                far.as_ptr(),
                buf.as_ptr(),
                buf.as_mut_ptr(),
                FRAME,
                2,
            );
            assert_eq!(err, QuellError::None);
            assert_eq!(buf, out);
        }
        quell_destroy(separate);
        quell_destroy(in_place);
    }

    #[test]
    fn partial_overlap_is_rejected() {
        let aec = quell_create(small_config());
        let mut buf = vec![0i16; FRAME * 2];
        let far = vec![0i16; FRAME];
        let base = buf.as_mut_ptr();
        // Safety: offset stays inside `buf`.
        let shifted = unsafe { base.add(1) };
        let err = quell_process(aec, far.as_ptr(), base.cast_const(), shifted, FRAME, 1);
        assert_eq!(err, QuellError::BadArgument);

        let mut out = vec![0i16; FRAME];
        let err = quell_process(aec, out.as_ptr(), buf.as_ptr(), out.as_mut_ptr(), FRAME, 1);
        assert_eq!(err, QuellError::BadArgument);
        quell_destroy(aec);
    }

    #[test]
    fn reset_clears_statistics() {
        let aec = quell_create(small_config());
        let (far, near) = echo_frames(1);
        let mut out = vec![0i16; FRAME];
        quell_process(aec, far.as_ptr(), near.as_ptr(), out.as_mut_ptr(), FRAME, 1);
        assert_eq!(quell_reset(aec), QuellError::None);

        let mut stats = QuellStats::default();
        quell_get_statistics(aec, &mut stats);
        assert_eq!(stats.frames_processed, 0);
        assert!(!stats.has_erle_db);
        assert_eq!(quell_erle_db(aec), 0.0);
        quell_destroy(aec);
    }
}
