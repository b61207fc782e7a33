//! The escape-time evaluator.

use num::Complex;

/// A point is considered escaped once the sum of its real and
/// imaginary parts exceeds this.  Note that this is a sum, not the
/// squared magnitude; the rendered boundary depends on it.
pub const ESCAPE_SUM: f64 = 16.0;

/// Iterate `z = z * z + c` starting from `z = c`, counting the
/// iterations survived before `re + im` passes [`ESCAPE_SUM`].  The
/// result is always in `0..=max_iterations`; points that never escape
/// report the full budget.
#[inline]
pub fn escape_iterations(c: Complex<f64>, max_iterations: u32) -> u32 {
    let mut z = c;
    let mut n = 0;
    while n < max_iterations {
        z = z * z + c;
        if z.re + z.im > ESCAPE_SUM {
            break;
        }
        n += 1;
    }
    n
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_never_escapes() {
        for &limit in &[1, 64, 1000] {
            assert_eq!(escape_iterations(Complex::new(0.0, 0.0), limit), limit);
        }
    }

    #[test]
    fn far_point_escapes_immediately() {
        assert_eq!(escape_iterations(Complex::new(10.0, 10.0), 64), 0);
    }

    #[test]
    fn sum_test_counts_through_negative_excursions() {
        // (1,3) -> (-7,7) -> (1,-97) -> (-9407,-193) -> escapes
        assert_eq!(escape_iterations(Complex::new(1.0, 1.0), 64), 4);
        assert_eq!(escape_iterations(Complex::new(1.0, 1.0), 3), 3);
    }

    #[test]
    fn result_stays_within_budget() {
        let mut re = -2.0;
        while re <= 2.0 {
            let mut im = -2.0;
            while im <= 2.0 {
                let n = escape_iterations(Complex::new(re, im), 50);
                assert!(n <= 50);
                im += 0.25;
            }
            re += 0.25;
        }
    }
}
