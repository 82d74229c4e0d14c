//! Sample-exact comparison of `i16` buffers.

use std::fmt;

/// Result of comparing two audio buffers.
#[derive(Debug)]
pub struct ComparisonResult {
    pub max_abs_diff: i32,
    pub max_abs_diff_index: usize,
    pub mismatches: usize,
    pub total: usize,
}

impl fmt::Display for ComparisonResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "max_abs_diff={} (at index {}), mismatches={}/{}",
            self.max_abs_diff, self.max_abs_diff_index, self.mismatches, self.total,
        )
    }
}

/// Compare two `i16` slices, counting samples that differ by more than
/// `tolerance`.
pub fn compare_i16(actual: &[i16], expected: &[i16], tolerance: i32) -> ComparisonResult {
    assert_eq!(actual.len(), expected.len(), "Length mismatch");
    let mut max_abs_diff = 0;
    let mut max_abs_diff_index = 0;
    let mut mismatches = 0;

    for (i, (&a, &e)) in actual.iter().zip(expected).enumerate() {
        let diff = (i32::from(a) - i32::from(e)).abs();
        if diff > max_abs_diff {
            max_abs_diff = diff;
            max_abs_diff_index = i;
        }
        if diff > tolerance {
            mismatches += 1;
        }
    }

    ComparisonResult {
        max_abs_diff,
        max_abs_diff_index,
        mismatches,
        total: actual.len(),
    }
}

/// Assert two `i16` slices are bit-identical.
pub fn assert_i16_exact(actual: &[i16], expected: &[i16]) {
    let result = compare_i16(actual, expected, 0);
    assert!(
        result.mismatches == 0,
        "i16 comparison failed: {result}\n  actual[{}]={}, expected[{}]={}",
        result.max_abs_diff_index,
        actual[result.max_abs_diff_index],
        result.max_abs_diff_index,
        expected[result.max_abs_diff_index],
    );
}

/// Mean absolute value of a buffer, 0 for an empty one.
pub fn mean_abs(samples: &[i16]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|&s| f64::from(s).abs()).sum::<f64>() / samples.len() as f64
}
