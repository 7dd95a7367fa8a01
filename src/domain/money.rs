use std::fmt;

/// Money is represented as integer cents to avoid floating-point precision issues.
/// For USD, 1 unit = 100 cents, so $50.00 = 5000 cents.
pub type Cents = i64;

/// Format cents as a human-readable currency string.
/// Example: 5000 -> "50.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}

/// Parse a decimal string into cents.
/// Example: "50.00" -> 5000, "12.5" -> 1250, "100" -> 10000
pub fn parse_cents(input: &str) -> Result<Cents, ParseCentsError> {
    let input = input.trim();
    let negative = input.starts_with('-');
    let input = input.trim_start_matches('-');

    let parts: Vec<&str> = input.split('.').collect();
    match parts.len() {
        1 => {
            let units: i64 = parts[0]
                .parse()
                .map_err(|_| ParseCentsError::InvalidFormat)?;
            let cents = units * 100;
            Ok(if negative { -cents } else { cents })
        }
        2 => {
            let units: i64 = if parts[0].is_empty() {
                0
            } else {
                parts[0]
                    .parse()
                    .map_err(|_| ParseCentsError::InvalidFormat)?
            };

            // Pad or truncate the decimal part to 2 digits
            let decimal_str = parts[1];
            let decimal_cents: i64 = match decimal_str.len() {
                0 => 0,
                1 => {
                    decimal_str
                        .parse::<i64>()
                        .map_err(|_| ParseCentsError::InvalidFormat)?
                        * 10
                }
                _ => decimal_str[..2]
                    .parse()
                    .map_err(|_| ParseCentsError::InvalidFormat)?,
            };

            let cents = units * 100 + decimal_cents;
            Ok(if negative { -cents } else { cents })
        }
        _ => Err(ParseCentsError::InvalidFormat),
    }
}

/// Percentage of `part` against `base`.
/// Returns 0.0 when the base is zero; every percent-of-base figure in the
/// engine goes through this guard instead of dividing inline.
pub fn percent_of(part: Cents, base: Cents) -> f64 {
    if base == 0 {
        0.0
    } else {
        part as f64 / base as f64 * 100.0
    }
}

/// Percentage change from `prior` to `current`.
/// Returns 0.0 when the prior value is zero regardless of the current value.
/// That is the documented contract for variance against an empty prior
/// period, not an oversight to be replaced with NaN or an error.
pub fn change_percent(current: Cents, prior: Cents) -> f64 {
    if prior == 0 {
        0.0
    } else {
        (current - prior) as f64 / prior.abs() as f64 * 100.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCentsError {
    InvalidFormat,
}

impl fmt::Display for ParseCentsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseCentsError::InvalidFormat => write!(f, "invalid money format"),
        }
    }
}

impl std::error::Error for ParseCentsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(5000), "50.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(1), "0.01");
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(-5000), "-50.00");
    }

    #[test]
    fn test_parse_cents() {
        assert_eq!(parse_cents("50.00"), Ok(5000));
        assert_eq!(parse_cents("50"), Ok(5000));
        assert_eq!(parse_cents("12.5"), Ok(1250));
        assert_eq!(parse_cents(".50"), Ok(50));
        assert_eq!(parse_cents("-50.00"), Ok(-5000));
        assert_eq!(parse_cents("100.999"), Ok(10099)); // Truncates
    }

    #[test]
    fn test_parse_cents_invalid() {
        assert!(parse_cents("abc").is_err());
        assert!(parse_cents("12.34.56").is_err());
    }

    #[test]
    fn test_percent_of_zero_base() {
        assert_eq!(percent_of(500, 0), 0.0);
        assert_eq!(percent_of(0, 0), 0.0);
    }

    #[test]
    fn test_percent_of() {
        assert!((percent_of(805, 1150) - 70.0).abs() < 1e-9);
        assert!((percent_of(345, 1150) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_change_percent_zero_prior() {
        assert_eq!(change_percent(1000, 0), 0.0);
        assert_eq!(change_percent(-1000, 0), 0.0);
    }

    #[test]
    fn test_change_percent_negative_prior_uses_abs() {
        // A loss shrinking from -100.00 to -50.00 reads as +50%
        assert!((change_percent(-5000, -10000) - 50.0).abs() < 1e-9);
    }
}
