//! Numeric conversion and formatting utilities.
//!
//! These functions handle conversions between numeric types with explicit
//! handling of precision loss and bounds checking.

/// Convert usize to f64 with allowed precision loss.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    value as f64
}

/// Convert i32 to u8 with clamping to [0, 255].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn clamp_to_u8(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Convert f64 to usize with bounds checking.
///
/// Returns `None` if the value is not finite, negative, or >= `max_exclusive`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn f64_to_usize_bounded(value: f64, max_exclusive: usize) -> Option<usize> {
    if !value.is_finite() || value < 0.0 {
        return None;
    }
    if value >= usize_to_f64(max_exclusive) {
        return None;
    }
    Some(value as usize)
}

/// Format a bin content for status display.
///
/// Integral counts are printed with SI suffixes (K, M, G), fractional values
/// (e.g. background-subtracted matrices) with two decimals.
///
/// # Examples
///
/// ```
/// use gammaview_core::util::format_count;
/// assert_eq!(format_count(42.0), "42");
/// assert_eq!(format_count(45_000.0), "45.0K");
/// assert_eq!(format_count(1_500_000.0), "1.50M");
/// assert_eq!(format_count(0.25), "0.25");
/// ```
#[must_use]
pub fn format_count(n: f64) -> String {
    let abs = n.abs();
    if n.fract() != 0.0 && abs < 1_000.0 {
        format!("{n:.2}")
    } else if abs >= 1_000_000_000.0 {
        format!("{:.2}G", n / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.2}M", n / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}K", n / 1_000.0)
    } else {
        format!("{n:.0}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_to_u8() {
        assert_eq!(clamp_to_u8(-4), 0);
        assert_eq!(clamp_to_u8(128), 128);
        assert_eq!(clamp_to_u8(300), 255);
    }

    #[test]
    fn test_f64_to_usize_bounded() {
        assert_eq!(f64_to_usize_bounded(3.7, 10), Some(3));
        assert_eq!(f64_to_usize_bounded(10.0, 10), None);
        assert_eq!(f64_to_usize_bounded(-0.5, 10), None);
        assert_eq!(f64_to_usize_bounded(f64::NAN, 10), None);
    }

    #[test]
    fn test_format_count_negative() {
        assert_eq!(format_count(-2_500.0), "-2.5K");
        assert_eq!(format_count(0.0), "0");
    }
}
