//! Exact 2-digit fixed-point amounts, stored as `i64` hundredths.
//!
//! Money and counted quantities never touch floating point: parsing is
//! string math, so `47.82` survives any number of round trips.

/// Parse a decimal string into hundredths. Accepts an optional leading `-`,
/// at most two fraction digits, and a bare integer part (`"12"` → 1200).
/// Returns None for anything else, including 3+ fraction digits.
pub fn parse_fixed2(value: &str) -> Option<i64> {
    let s = value.trim();
    let (negative, s) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if s.is_empty() {
        return None;
    }

    let (whole, frac) = match s.split_once('.') {
        Some((w, f)) => (w, f),
        None => (s, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if frac.len() > 2 {
        return None;
    }
    if !whole.bytes().all(|b| b.is_ascii_digit()) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let mut hundredths: i64 = 0;
    for b in whole.bytes() {
        hundredths = hundredths
            .checked_mul(10)?
            .checked_add(i64::from(b - b'0'))?;
    }
    hundredths = hundredths.checked_mul(100)?;
    let mut frac_part: i64 = 0;
    for b in frac.bytes() {
        frac_part = frac_part * 10 + i64::from(b - b'0');
    }
    if frac.len() == 1 {
        frac_part *= 10;
    }
    hundredths = hundredths.checked_add(frac_part)?;

    Some(if negative { -hundredths } else { hundredths })
}

/// Format hundredths back as a decimal string with two fraction digits.
pub fn format_fixed2(hundredths: i64) -> String {
    let sign = if hundredths < 0 { "-" } else { "" };
    let abs = hundredths.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_exact_amounts() {
        assert_eq!(parse_fixed2("47.82"), Some(4782));
        assert_eq!(parse_fixed2("0.05"), Some(5));
        assert_eq!(parse_fixed2("12"), Some(1200));
        assert_eq!(parse_fixed2("12."), Some(1200));
        assert_eq!(parse_fixed2(".5"), Some(50));
        assert_eq!(parse_fixed2("2.5"), Some(250));
        assert_eq!(parse_fixed2("-3.10"), Some(-310));
        assert_eq!(parse_fixed2(" 47.82 "), Some(4782));
    }

    #[test]
    fn rejects_inexact_or_malformed() {
        assert_eq!(parse_fixed2("47.825"), None);
        assert_eq!(parse_fixed2(""), None);
        assert_eq!(parse_fixed2("-"), None);
        assert_eq!(parse_fixed2("."), None);
        assert_eq!(parse_fixed2("$47.82"), None);
        assert_eq!(parse_fixed2("12.3.4"), None);
        assert_eq!(parse_fixed2("1,200.00"), None);
        assert_eq!(parse_fixed2("abc"), None);
    }

    #[test]
    fn round_trips() {
        for value in ["47.82", "0.00", "0.05", "2.50", "-3.10", "1200.00"] {
            let cents = parse_fixed2(value).unwrap();
            assert_eq!(format_fixed2(cents), value.trim_start_matches('+'));
        }
    }

    #[test]
    fn overflow_is_none() {
        assert_eq!(parse_fixed2("99999999999999999999"), None);
    }
}
