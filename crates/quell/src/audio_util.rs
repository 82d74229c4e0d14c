//! Sample format conversions for the floating-point filter path.
//!
//! | Name  | Type  | Range                  |
//! |-------|-------|------------------------|
//! | S16   | `i16` | \[-32768, 32767\]      |
//! | Float | `f32` | \[-1.0, 1.0\]          |

const S16_TO_FLOAT_SCALING: f32 = 1.0 / 32768.0;

/// Full-scale factor applied on the way back to S16.
const FLOAT_TO_S16_SCALING: f32 = 32767.0;

/// Convert a single S16 sample to Float \[-1.0, 1.0\].
#[inline]
pub(crate) fn s16_to_float(v: i16) -> f32 {
    f32::from(v) * S16_TO_FLOAT_SCALING
}

/// Convert a single Float sample to S16, scaling by 32767 and truncating
/// toward zero. Out-of-range values saturate.
#[inline]
pub(crate) fn float_to_s16_truncating(v: f32) -> i16 {
    (v * FLOAT_TO_S16_SCALING) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s16_to_float_full_scale() {
        assert_eq!(s16_to_float(i16::MIN), -1.0);
        assert_eq!(s16_to_float(16384), 0.5);
        assert_eq!(s16_to_float(0), 0.0);
    }

    #[test]
    fn float_to_s16_truncates() {
        // 2000 / 32768 * 32767 = 1999.94
        assert_eq!(float_to_s16_truncating(s16_to_float(2000)), 1999);
        assert_eq!(float_to_s16_truncating(-0.5), -16383);
        assert_eq!(float_to_s16_truncating(1.0), 32767);
    }

    #[test]
    fn float_to_s16_saturates() {
        assert_eq!(float_to_s16_truncating(3.0), i16::MAX);
        assert_eq!(float_to_s16_truncating(-3.0), i16::MIN);
        assert_eq!(float_to_s16_truncating(f32::NAN), 0);
    }
}
