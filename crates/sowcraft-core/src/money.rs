//! AUD formatting and rounding.

/// Round half-up to the nearest multiple of `increment`.
///
/// A tiny epsilon absorbs binary noise so that `13_550.0` lands on `13_600.0`
/// even when it arrives as `13_549.999999999998`. Non-positive increments
/// return the value unchanged.
pub fn round_to_increment(value: f64, increment: f64) -> f64 {
    if !(increment.is_finite() && increment > 0.0) || !value.is_finite() {
        return value;
    }
    (value / increment + 0.5 + 1e-9).floor() * increment
}

/// Format as Australian dollars: `$13,579.50`, `-$1,000.00`.
pub fn format_aud(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0.00".to_string();
    }
    let cents = (amount.abs() * 100.0).round() as u64;
    let dollars = cents / 100;
    let rem = cents % 100;

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{rem:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_half_up_to_hundred() {
        assert_eq!(round_to_increment(13_579.5, 100.0), 13_600.0);
        assert_eq!(round_to_increment(13_549.99, 100.0), 13_500.0);
        assert_eq!(round_to_increment(13_550.0, 100.0), 13_600.0);
        assert_eq!(round_to_increment(0.0, 100.0), 0.0);
    }

    #[test]
    fn rounding_with_bad_increment_is_identity() {
        assert_eq!(round_to_increment(123.4, 0.0), 123.4);
        assert_eq!(round_to_increment(123.4, -10.0), 123.4);
    }

    #[test]
    fn formats_with_grouping() {
        assert_eq!(format_aud(13_579.5), "$13,579.50");
        assert_eq!(format_aud(0.0), "$0.00");
        assert_eq!(format_aud(999.999), "$1,000.00");
        assert_eq!(format_aud(1_234_567.0), "$1,234,567.00");
        assert_eq!(format_aud(-42.1), "-$42.10");
    }
}
