#![doc = include_str!("../README.md")]

/// Scale between a Q15 raw value and its real value.
pub const Q15_ONE: f32 = 32768.0;

/// Fractional bits in a Q15 value.
pub const Q15_SHIFT: u32 = 15;

/// A 16-bit signed fixed-point fraction with 15 fractional bits.
///
/// Represents real values in `[-1.0, 1.0)` with a resolution of `1 / 32768`.
/// Every arithmetic operation saturates at the `i16` bounds; none of them can
/// wrap around or panic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Q15(i16);

impl Q15 {
    /// `0.0`
    pub const ZERO: Self = Self(0);
    /// Largest representable value, `32767 / 32768`.
    pub const MAX: Self = Self(i16::MAX);
    /// Smallest representable value, `-1.0`.
    pub const MIN: Self = Self(i16::MIN);

    /// Wraps a raw `i16` without scaling.
    #[inline]
    pub const fn from_raw(raw: i16) -> Self {
        Self(raw)
    }

    /// Converts a real value to Q15.
    ///
    /// The scaled value is truncated toward zero. Values outside `[-1.0, 1.0)`
    /// clamp to [`Q15::MIN`] / [`Q15::MAX`] and NaN maps to zero.
    #[inline]
    pub fn from_f32(value: f32) -> Self {
        // `as` saturates and truncates toward zero.
        Self((value * Q15_ONE) as i16)
    }

    /// The underlying raw value.
    #[inline]
    pub const fn raw(self) -> i16 {
        self.0
    }

    /// The real value, `raw / 32768`.
    #[inline]
    pub fn to_f32(self) -> f32 {
        f32::from(self.0) / Q15_ONE
    }

    /// Clamps a 32-bit intermediate to the `i16` range.
    #[inline]
    pub const fn saturate(value: i32) -> i16 {
        if value > i16::MAX as i32 {
            i16::MAX
        } else if value < i16::MIN as i32 {
            i16::MIN
        } else {
            value as i16
        }
    }

    /// Clamps a 64-bit accumulator to the `i16` range.
    #[inline]
    pub const fn saturate_wide(value: i64) -> i16 {
        if value > i16::MAX as i64 {
            i16::MAX
        } else if value < i16::MIN as i64 {
            i16::MIN
        } else {
            value as i16
        }
    }

    /// `self + other`, clamped.
    #[inline]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(Self::saturate(self.0 as i32 + other.0 as i32))
    }

    /// `self - other`, clamped.
    #[inline]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(Self::saturate(self.0 as i32 - other.0 as i32))
    }

    /// `self * other` with a 32-bit product shifted right by 15.
    ///
    /// The shift truncates toward negative infinity. The single overflowing
    /// case, `MIN * MIN`, clamps to [`Q15::MAX`].
    #[inline]
    pub const fn saturating_mul(self, other: Self) -> Self {
        let product = self.0 as i32 * other.0 as i32;
        Self(Self::saturate(product >> Q15_SHIFT))
    }
}

impl From<i16> for Q15 {
    fn from(raw: i16) -> Self {
        Self(raw)
    }
}

impl From<Q15> for i16 {
    fn from(value: Q15) -> Self {
        value.0
    }
}

impl From<Q15> for f32 {
    fn from(value: Q15) -> Self {
        value.to_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prop_assert_eq;
    use test_strategy::proptest;

    #[test]
    fn float_round_trip_is_close() {
        let half = Q15::from_f32(0.5);
        assert_eq!(half.raw(), 16384);
        assert!((half.to_f32() - 0.5).abs() < 0.01);

        let quarter = Q15::from_f32(0.25);
        assert!((quarter.to_f32() - 0.25).abs() < 0.01);
    }

    #[test]
    fn arithmetic_matches_real_values() {
        let a = Q15::from_f32(0.5);
        let b = Q15::from_f32(0.25);
        assert!((a.saturating_add(b).to_f32() - 0.75).abs() < 0.01);
        assert!((a.saturating_sub(b).to_f32() - 0.25).abs() < 0.01);
        assert!((a.saturating_mul(b).to_f32() - 0.125).abs() < 0.02);
    }

    #[test]
    fn from_f32_truncates_and_clamps() {
        // 0.99999 * 32768 = 32767.67 truncates to 32767.
        assert_eq!(Q15::from_f32(0.99999).raw(), 32767);
        assert_eq!(Q15::from_f32(1.0), Q15::MAX);
        assert_eq!(Q15::from_f32(4.0), Q15::MAX);
        assert_eq!(Q15::from_f32(-1.0), Q15::MIN);
        assert_eq!(Q15::from_f32(-7.5), Q15::MIN);
        assert_eq!(Q15::from_f32(f32::NAN), Q15::ZERO);
        assert_eq!(Q15::from_f32(-0.00001).raw(), 0);
    }

    #[test]
    fn add_sub_saturate_at_bounds() {
        let big = Q15::from_raw(30000);
        assert_eq!(big.saturating_add(big), Q15::MAX);
        assert_eq!(Q15::from_raw(-30000).saturating_add(Q15::from_raw(-30000)), Q15::MIN);
        assert_eq!(Q15::MIN.saturating_sub(Q15::from_raw(1)), Q15::MIN);
        assert_eq!(Q15::MAX.saturating_sub(Q15::MIN), Q15::MAX);
    }

    #[test]
    fn mul_truncates_instead_of_rounding() {
        // 3 * 16384 = 49152, >> 15 = 1 (1.5 truncated).
        assert_eq!(Q15::from_raw(3).saturating_mul(Q15::from_raw(16384)).raw(), 1);
        // Arithmetic shift floors negative products: -49152 >> 15 = -2.
        assert_eq!(Q15::from_raw(-3).saturating_mul(Q15::from_raw(16384)).raw(), -2);
    }

    #[test]
    fn mul_min_by_min_clamps() {
        assert_eq!(Q15::MIN.saturating_mul(Q15::MIN), Q15::MAX);
        assert_eq!(Q15::MIN.saturating_mul(Q15::MAX).raw(), -32767);
    }

    #[test]
    fn saturate_wide_clamps() {
        assert_eq!(Q15::saturate_wide(i64::MAX), i16::MAX);
        assert_eq!(Q15::saturate_wide(i64::MIN), i16::MIN);
        assert_eq!(Q15::saturate_wide(-1234), -1234);
    }

    // -- Property tests --

    #[proptest]
    fn add_equals_clamped_wide_sum(a: i16, b: i16) {
        let sum = Q15::from_raw(a).saturating_add(Q15::from_raw(b));
        prop_assert_eq!(
            i32::from(sum.raw()),
            (i32::from(a) + i32::from(b)).clamp(-32768, 32767)
        );
    }

    #[proptest]
    fn sub_equals_clamped_wide_difference(a: i16, b: i16) {
        let diff = Q15::from_raw(a).saturating_sub(Q15::from_raw(b));
        prop_assert_eq!(
            i32::from(diff.raw()),
            (i32::from(a) - i32::from(b)).clamp(-32768, 32767)
        );
    }

    #[proptest]
    fn mul_equals_clamped_shifted_product(a: i16, b: i16) {
        let product = Q15::from_raw(a).saturating_mul(Q15::from_raw(b));
        let wide = (i64::from(a) * i64::from(b)) >> 15;
        prop_assert_eq!(i64::from(product.raw()), wide.clamp(-32768, 32767));
    }

    #[proptest]
    fn from_f32_error_is_below_one_lsb(
        #[strategy(-1.0f32..0.99996)] value: f32,
    ) {
        let q = Q15::from_f32(value);
        assert!((q.to_f32() - value).abs() < 1.0 / 32768.0 + f32::EPSILON);
    }
}
