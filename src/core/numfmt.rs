//! Number parsing and rendering for case values.
//!
//! Reals are rendered in shortest round-trip form with a trailing `.0` for
//! integral values, switching to exponent notation below `1e-4` and from
//! `1e16` upward (`1e+16`, `1.5e-05`).

/// Renders a real the way it appears in the trace and the output file.
pub fn format_real(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let rendered = format!("{:e}", value);
        return match rendered.split_once('e') {
            Some((mantissa, exponent)) => {
                let (sign, digits) = match exponent.strip_prefix('-') {
                    Some(digits) => ('-', digits),
                    None => ('+', exponent),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => rendered,
        };
    }

    let rendered = value.to_string();
    if rendered.contains('.') {
        rendered
    } else {
        format!("{}.0", rendered)
    }
}

/// Rounds to two decimals using the exact binary value, ties to even.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.2}", value).parse().unwrap_or(value)
}

/// Parses a decimal field, tolerating surrounding whitespace.
pub fn parse_real(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok()
}

/// Parses a decimal field and truncates it toward zero. Values that do not
/// fit in an `i64` are rejected rather than saturated.
pub fn parse_truncated(text: &str) -> Option<i64> {
    let value = parse_real(text)?.trunc();
    // i64::MIN is exactly -2^63; 2^63 itself is already out of range.
    let limit = 2f64.powi(63);
    if !(-limit..limit).contains(&value) {
        return None;
    }
    Some(value as i64)
}
