//! Integer helpers exposed to C.

/// Adds two 32-bit integers, wrapping on overflow like the C `int` addition
/// a caller would expect from fixed-width hardware.
pub fn add_int(a: i32, b: i32) -> i32 {
    a.wrapping_add(b)
}

/// Returns `a + b`, wrapping on overflow.
#[unsafe(no_mangle)]
pub extern "C" fn add(a: i32, b: i32) -> i32 {
    add_int(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adds_in_range() {
        assert_eq!(add(2, 3), 5);
        assert_eq!(add(-7, 7), 0);
        assert_eq!(add_int(-1, -1), -2);
    }

    #[test]
    fn wraps_on_overflow() {
        assert_eq!(add_int(i32::MAX, 1), i32::MIN);
        assert_eq!(add_int(i32::MIN, -1), i32::MAX);
        assert_eq!(add_int(i32::MIN, i32::MIN), 0);
    }

    #[test]
    fn matches_wide_addition_truncated() {
        let samples = [i32::MIN, -65_536, -1, 0, 1, 12_345, i32::MAX];
        for a in samples {
            for b in samples {
                let wide = i64::from(a) + i64::from(b);
                assert_eq!(add_int(a, b), wide as i32, "{a} + {b}");
            }
        }
    }
}
