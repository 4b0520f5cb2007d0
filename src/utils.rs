/// Rounds `number` to `significant_digits` meaningful digits, ties to even.
///
/// Zero is returned unchanged and never reaches `log10`. Non-finite input is
/// passed through; callers filter those out before formatting.
pub fn round_to_significant_digits(number: f64, significant_digits: u32) -> f64 {
    if number == 0.0 {
        return 0.0;
    }
    if !number.is_finite() {
        return number;
    }

    let magnitude = number.abs().log10().floor() as i32;
    let exponent = significant_digits as i32 - 1 - magnitude;

    let mantissa = if exponent >= 0 {
        (number * 10f64.powi(exponent)).round_ties_even()
    } else {
        (number / 10f64.powi(-exponent)).round_ties_even()
    };

    // Parsing `<mantissa>e<-exponent>` yields the double nearest the decimal,
    // so no scaling noise survives past the kept digits.
    match format!("{}e{}", mantissa, -exponent).parse::<f64>() {
        Ok(rounded) if rounded.is_finite() => rounded,
        _ => number,
    }
}

/// Renders an already-rounded metric value using the shortest decimal form.
///
/// # Examples
/// - `1230.0` → `"1230"`
/// - `0.0123` → `"0.0123"`
/// - `60.0` → `"60"`
pub fn format_significant(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

/// Renders a percentage with `decimals` places, dropping an all-zero fraction
/// ("45.0" → "45") and never producing a negative zero.
pub fn format_percentage(value: f64, decimals: usize) -> String {
    let mut text = format!("{:.*}", decimals, value);

    if let Some(dot) = text.find('.') {
        if text[dot + 1..].bytes().all(|b| b == b'0') {
            text.truncate(dot);
        }
    }

    if text == "-0" {
        text = "0".to_string();
    }

    text
}
