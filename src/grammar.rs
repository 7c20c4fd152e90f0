//! Shared grammar predicates and canonical number formatting.
//!
//! Both halves of the codec agree on one set of character classes and one
//! numeric normalizer, defined here:
//!
//! - the safe-key class `[0-9A-Za-z_.:-]` used for keys and unquoted tokens
//! - the terminator set that bounds unquoted scalar reads
//! - the boundary-start class for the decoder's key-boundary heuristic
//! - the reserved literals `true`, `false`, `null`
//! - the canonical decimal formatter with its fast and precise modes
//!
//! All matchers are hand-rolled byte scanners; the token classes are small
//! enough that a regex engine would be the heavier tool.

use num_bigint::BigUint;

use crate::options::DecimalMode;

/// Literals that an unquoted token may never spell.
pub(crate) const RESERVED_LITERALS: [&str; 3] = ["true", "false", "null"];

/// `[0-9A-Za-z_.:-]`, the characters legal in keys and unquoted tokens.
#[inline]
pub(crate) fn is_safe_key_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b':' | b'-')
}

/// A legal key: non-empty, safe-key bytes only.
#[inline]
pub(crate) fn is_safe_key(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(is_safe_key_byte)
}

/// Bytes that may start a key boundary inside a separator-less scalar.
///
/// Digits and `-` are excluded on purpose: treating them as boundary starts
/// would split numeric payloads like `k=123` or `k=-5`.
#[inline]
pub(crate) fn is_boundary_start_byte(b: u8) -> bool {
    b.is_ascii_alphabetic() || matches!(b, b'_' | b'.' | b':')
}

/// Space, tab, CR, LF.
#[inline]
pub(crate) fn is_whitespace_byte(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// Bytes that end an unquoted scalar read: pair/row/element separators,
/// structural closers and openers, and whitespace.
#[inline]
pub(crate) fn is_terminator_byte(b: u8) -> bool {
    is_whitespace_byte(b) || matches!(b, b',' | b';' | b')' | b']' | b'}' | b'(' | b'[' | b'{')
}

#[inline]
pub(crate) fn is_reserved_literal(s: &str) -> bool {
    RESERVED_LITERALS.contains(&s)
}

/// Matches `-?[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?` — the encoder-side test
/// for strings that would read back as numbers and therefore need quotes.
///
/// Deliberately looser than the decoder's token classes: `007` is
/// numeric-like here (so the string `"007"` gets quoted) even though the
/// decoder would never turn the bare token into a number.
pub(crate) fn is_numeric_like(s: &str) -> bool {
    let b = s.as_bytes();
    let mut i = usize::from(b.first() == Some(&b'-'));
    let int_start = i;
    while i < b.len() && b[i].is_ascii_digit() {
        i += 1;
    }
    if i == int_start {
        return false;
    }
    if i < b.len() && b[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        if i == frac_start {
            return false;
        }
    }
    if i < b.len() && matches!(b[i], b'e' | b'E') {
        i += 1;
        if i < b.len() && matches!(b[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    i == b.len()
}

/// A string that may be written without quotes: safe-key bytes only, not a
/// reserved literal, not numeric-like.
pub(crate) fn is_safe_token(s: &str) -> bool {
    is_safe_key(s) && !is_reserved_literal(s) && !is_numeric_like(s)
}

/// Matches `-?(0|[1-9][0-9]*)` — the decoder-side integer class.
///
/// Leading zeros are rejected so that tokens like `007` stay strings.
pub(crate) fn is_integer_token(s: &str) -> bool {
    let b = s.as_bytes();
    let i = usize::from(b.first() == Some(&b'-'));
    match b.len() - i {
        0 => false,
        1 => b[i].is_ascii_digit(),
        _ => b[i].is_ascii_digit() && b[i] != b'0' && b[i + 1..].iter().all(u8::is_ascii_digit),
    }
}

/// Matches `-?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?` — the
/// decoder-side class for tokens converted to a host float.
pub(crate) fn is_decimal_token(s: &str) -> bool {
    let b = s.as_bytes();
    let mut i = usize::from(b.first() == Some(&b'-'));
    if i >= b.len() || !b[i].is_ascii_digit() {
        return false;
    }
    if b[i] == b'0' {
        i += 1;
    } else {
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < b.len() && b[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        if i == frac_start {
            return false;
        }
    }
    if i < b.len() && matches!(b[i], b'e' | b'E') {
        i += 1;
        if i < b.len() && matches!(b[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return false;
        }
    }
    i == b.len()
}

/// Formats a float in canonical CTON form.
///
/// Non-finite values normalize to `null`. Finite values come out in plain
/// positional notation: no exponent, no leading `+`, no trailing fractional
/// zeros, and negative zero collapses to `0`.
pub(crate) fn format_decimal(v: f64, mode: DecimalMode) -> String {
    if !v.is_finite() {
        return "null".to_string();
    }
    let raw = match mode {
        DecimalMode::Fast => {
            let s = v.to_string();
            // Shortest-round-trip output carrying an exponent cannot be
            // emitted as-is; expand it exactly instead.
            if s.contains(['e', 'E']) {
                exact_expansion(v)
            } else {
                s
            }
        }
        DecimalMode::Precise => exact_expansion(v),
    };
    canonicalize_decimal(&raw)
}

/// Full fixed-point expansion of a float's exact binary value.
///
/// Every finite double is mantissa × 2^exp; for negative exp the digits are
/// mantissa × 5^(-exp) with the decimal point placed -exp digits from the
/// right.
fn exact_expansion(v: f64) -> String {
    let bits = v.to_bits();
    let negative = bits >> 63 == 1;
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let frac = bits & ((1u64 << 52) - 1);
    let (mantissa, exp) = if biased == 0 {
        (frac, -1074i64)
    } else {
        (frac | (1u64 << 52), biased - 1075)
    };
    if mantissa == 0 {
        return "0".to_string();
    }

    let m = BigUint::from(mantissa);
    let (digits, scale) = if exp >= 0 {
        ((m << exp as usize).to_string(), 0)
    } else {
        let k = (-exp) as u32;
        ((m * BigUint::from(5u8).pow(k)).to_string(), k as usize)
    };

    let body = if scale == 0 {
        digits
    } else if digits.len() <= scale {
        format!("0.{}{}", "0".repeat(scale - digits.len()), digits)
    } else {
        let (int_part, frac_part) = digits.split_at(digits.len() - scale);
        format!("{int_part}.{frac_part}")
    };
    if negative {
        format!("-{body}")
    } else {
        body
    }
}

/// Applies the canonical cleanup pass: strip a leading `+`, collapse
/// all-zero forms to `0`, trim trailing fractional zeros and a dangling `.`.
fn canonicalize_decimal(s: &str) -> String {
    let s = s.strip_prefix('+').unwrap_or(s);
    let unsigned = s.strip_prefix('-').unwrap_or(s);
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, f),
        None => (unsigned, ""),
    };
    let all_zero = !int_part.is_empty()
        && int_part.bytes().all(|b| b == b'0')
        && frac_part.bytes().all(|b| b == b'0');
    if all_zero {
        return "0".to_string();
    }

    let mut out = s.to_string();
    if out.contains('.') {
        while out.ends_with('0') {
            out.pop();
        }
        if out.ends_with('.') {
            out.pop();
        }
    }
    out
}
