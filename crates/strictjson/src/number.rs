//! Shortest-round-trip number text in the classic double-conversion layout:
//! fixed notation while the decimal point sits in `(-6, 21]`, scientific
//! otherwise, a forced sign on positive exponents, unique zero, infinities as
//! the overflow literal `1e5000`, and NaN as `null`.

const OVERFLOW_LITERAL: &str = "1e5000";

pub(crate) fn format_double(out: &mut String, value: f64) {
    if value.is_nan() {
        out.push_str("null");
        return;
    }
    if value.is_infinite() {
        if value.is_sign_negative() {
            out.push('-');
        }
        out.push_str(OVERFLOW_LITERAL);
        return;
    }
    let mut buffer = ryu::Buffer::new();
    format_shortest(out, buffer.format_finite(value));
}

pub(crate) fn format_float(out: &mut String, value: f32) {
    if value.is_nan() {
        out.push_str("null");
        return;
    }
    if value.is_infinite() {
        if value.is_sign_negative() {
            out.push('-');
        }
        out.push_str(OVERFLOW_LITERAL);
        return;
    }
    let mut buffer = ryu::Buffer::new();
    format_shortest(out, buffer.format_finite(value));
}

/// Re-lay ryu's shortest digits (`-?d+(\.d+)?(e-?d+)?`) into the output
/// notation described above.
fn format_shortest(out: &mut String, repr: &str) {
    let (negative, repr) = match repr.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, repr),
    };
    let (mantissa, exponent) = match repr.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (
            mantissa,
            exponent
                .parse::<i32>()
                .expect("ryu emits a decimal exponent"),
        ),
        None => (repr, 0),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (mantissa, ""),
    };

    let mut digits = Vec::with_capacity(int_part.len() + frac_part.len());
    digits.extend_from_slice(int_part.as_bytes());
    digits.extend_from_slice(frac_part.as_bytes());
    let mut decimal_point = int_part.len() as i32 + exponent;

    let leading_zeros = digits.iter().take_while(|&&b| b == b'0').count();
    digits.drain(..leading_zeros);
    decimal_point -= leading_zeros as i32;
    while digits.last() == Some(&b'0') {
        digits.pop();
    }

    if digits.is_empty() {
        // Unique zero: the sign of -0.0 is dropped.
        out.push('0');
        return;
    }
    if negative {
        out.push('-');
    }

    if decimal_point > -6 && decimal_point <= 21 {
        if decimal_point <= 0 {
            out.push_str("0.");
            for _ in 0..-decimal_point {
                out.push('0');
            }
            push_digits(out, &digits);
        } else if decimal_point as usize >= digits.len() {
            push_digits(out, &digits);
            for _ in 0..decimal_point as usize - digits.len() {
                out.push('0');
            }
        } else {
            push_digits(out, &digits[..decimal_point as usize]);
            out.push('.');
            push_digits(out, &digits[decimal_point as usize..]);
        }
    } else {
        out.push(char::from(digits[0]));
        if digits.len() > 1 {
            out.push('.');
            push_digits(out, &digits[1..]);
        }
        out.push('e');
        let exponent = decimal_point - 1;
        if exponent >= 0 {
            out.push('+');
        }
        let mut itoa = itoa::Buffer::new();
        out.push_str(itoa.format(exponent));
    }
}

fn push_digits(out: &mut String, digits: &[u8]) {
    out.push_str(std::str::from_utf8(digits).expect("digits are ASCII"));
}
