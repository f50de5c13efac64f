//! Check-digit arithmetic for RIF tax identifiers.
//!
//! Every function here is total: malformed input yields `None`, `false` or the input
//! itself, because forms call these on each keystroke.

use super::TaxpayerKind;

/// Weights applied to the eight body digits, most significant first.
pub(crate) const COEFFICIENTS: [u32; 8] = [3, 2, 7, 6, 5, 4, 3, 2];

/// Length of letter + eight digits.
pub const BODY_LEN: usize = 9;
/// Length of a complete identifier including the check digit.
pub const FULL_LEN: usize = 10;

/// Uppercases the input and drops everything that is not `A-Z` or `0-9`.
pub fn normalize(raw: &str) -> String {
    raw.chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect()
}

/// Splits a normalized `L########` body into its kind and digits.
pub(crate) fn split_body(body: &str) -> Option<(TaxpayerKind, [u8; 8])> {
    let bytes = body.as_bytes();
    if bytes.len() != BODY_LEN {
        return None;
    }

    let kind = TaxpayerKind::from_letter(bytes[0] as char)?;
    let mut digits = [0u8; 8];
    for (slot, byte) in digits.iter_mut().zip(&bytes[1..]) {
        if !byte.is_ascii_digit() {
            return None;
        }
        *slot = byte - b'0';
    }

    Some((kind, digits))
}

pub(crate) fn check_digit_for(kind: TaxpayerKind, digits: &[u8; 8]) -> u8 {
    let weighted: u32 = digits
        .iter()
        .zip(COEFFICIENTS)
        .map(|(digit, coefficient)| u32::from(*digit) * coefficient)
        .sum();
    let sum = kind.weight() * 4 + weighted;

    // Remainders 0 and 1 both collapse to 0.
    match sum % 11 {
        remainder if remainder > 1 => (11 - remainder) as u8,
        _ => 0,
    }
}

/// Computes the check digit for a letter + 8 digit body, or `None` when the body is
/// not yet well formed.
pub fn compute_check_digit(body: &str) -> Option<u8> {
    let normalized = normalize(body);
    split_body(&normalized).map(|(kind, digits)| check_digit_for(kind, &digits))
}

/// Returns the body with its check digit appended, ready to be stored.
pub fn complete(body: &str) -> Option<String> {
    let normalized = normalize(body);
    let (kind, digits) = split_body(&normalized)?;
    let check = check_digit_for(kind, &digits);
    Some(format!("{normalized}{check}"))
}

/// True when the identifier is ten characters after normalization and its last
/// digit matches the computed one.
pub fn validate(full: &str) -> bool {
    let normalized = normalize(full);
    if normalized.len() != FULL_LEN {
        return false;
    }

    let (body, provided) = normalized.split_at(BODY_LEN);
    let provided = match provided.as_bytes() {
        [digit] if digit.is_ascii_digit() => digit - b'0',
        _ => return false,
    };

    split_body(body)
        .map(|(kind, digits)| check_digit_for(kind, &digits) == provided)
        .unwrap_or(false)
}

/// Renders `L-########-D`. Inputs that do not normalize to ten characters are
/// returned untouched.
pub fn format(full: &str) -> String {
    let normalized = normalize(full);
    if normalized.len() != FULL_LEN {
        return full.to_string();
    }

    format!(
        "{}-{}-{}",
        &normalized[..1],
        &normalized[1..BODY_LEN],
        &normalized[BODY_LEN..]
    )
}
