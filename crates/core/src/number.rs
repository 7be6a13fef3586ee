//! Numeric literal syntax and value rendering
//!
//! NRPC clients speak the JVM number grammar, so literals accept an optional
//! `d`/`f` type suffix plus the `NaN` and `Infinity` spellings, and values are
//! rendered the way `Double.toString` renders them: plain decimal between
//! `1e-3` and `1e7`, computerized scientific notation (`1.0E7`) outside it.

/// Parse an operand literal.
///
/// Returns `None` for anything that is not a number, which lets the caller
/// fall through to operator matching.
pub fn parse_literal(token: &str) -> Option<f64> {
    let trimmed = token.trim();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let special = match unsigned {
        "NaN" => Some(f64::NAN),
        "Infinity" => Some(f64::INFINITY),
        _ => None,
    };
    if let Some(value) = special {
        return Some(if negative { -value } else { value });
    }

    let body = unsigned
        .strip_suffix(['d', 'D', 'f', 'F'])
        .unwrap_or(unsigned);
    // Reject anything Rust's float grammar accepts but the wire grammar does not
    // ("inf", "nan", "infinity" in any case).
    let plain = body
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if body.is_empty() || body.starts_with(['+', '-']) || !plain {
        return None;
    }

    let value: f64 = body.parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Render a value for a `RESULT` / `PARTIAL_RESULT` response.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }

    let magnitude = value.abs();
    if (1e-3..1e7).contains(&magnitude) {
        // Debug keeps the trailing ".0" on integral values
        return format!("{:?}", value);
    }

    let sci = format!("{:e}", value);
    match sci.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => {
            format!("{}E{}", mantissa, exponent)
        }
        Some((mantissa, exponent)) => format!("{}.0E{}", mantissa, exponent),
        None => sci,
    }
}
