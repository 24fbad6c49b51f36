// 🔢 Identifier Validation - VKN / TCKN checksums
// Pure functions: no state, no errors. Invalid input is simply `false`.
//
// Strict contract: the raw input must be ASCII digits only and have the exact
// length before any checksum is evaluated. Nothing is trimmed here; callers
// that accept user input trim first (see `TaxPayer::new`).

use serde::{Deserialize, Serialize};

/// Length of a corporate tax identifier (Vergi Kimlik Numarası)
pub const VKN_LENGTH: usize = 10;

/// Length of a national identity number (T.C. Kimlik Numarası)
pub const TCKN_LENGTH: usize = 11;

// ============================================================================
// IDENTIFIER KIND
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxNumberKind {
    /// 10-digit corporate tax identifier
    Vkn,
    /// 11-digit national identity number used as an individual tax identifier
    Tckn,
}

impl TaxNumberKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaxNumberKind::Vkn => "VKN",
            TaxNumberKind::Tckn => "TCKN",
        }
    }

    pub fn length(&self) -> usize {
        match self {
            TaxNumberKind::Vkn => VKN_LENGTH,
            TaxNumberKind::Tckn => TCKN_LENGTH,
        }
    }
}

impl std::fmt::Display for TaxNumberKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// DISPATCHER
// ============================================================================

/// Check whether `text` is a valid VKN or TCKN.
///
/// Dispatches on the raw length: 10 characters go to the VKN check,
/// 11 characters to the TCKN check, anything else is rejected.
pub fn is_valid_tax_number(text: &str) -> bool {
    classify(text).is_some()
}

/// Classify `text` as a VKN, a TCKN, or neither (`None`).
pub fn classify(text: &str) -> Option<TaxNumberKind> {
    match text.len() {
        VKN_LENGTH if is_valid_vkn(text) => Some(TaxNumberKind::Vkn),
        TCKN_LENGTH if is_valid_tckn(text) => Some(TaxNumberKind::Tckn),
        _ => None,
    }
}

/// True if `tax_number` is a valid identifier and equals `other` exactly.
///
/// `other` is not validated on its own: an invalid `other` can never equal a
/// valid `tax_number`.
pub fn is_same_tax_number(tax_number: &str, other: &str) -> bool {
    is_valid_tax_number(tax_number) && tax_number == other
}

// ============================================================================
// CHECKSUMS
// ============================================================================

/// Validate a 10-digit VKN.
pub fn is_valid_vkn(text: &str) -> bool {
    let Some(digits) = parse_digits::<VKN_LENGTH>(text) else {
        return false;
    };

    let sum: u32 = digits[..VKN_LENGTH - 1]
        .iter()
        .enumerate()
        .map(|(i, &digit)| {
            let position = i as u32 + 1;
            let tmp = (digit + 10 - position) % 10;
            if tmp == 9 {
                tmp
            } else {
                (tmp * 2u32.pow(10 - position)) % 9
            }
        })
        .sum();

    digits[VKN_LENGTH - 1] == (10 - sum % 10) % 10
}

/// Validate an 11-digit TCKN.
pub fn is_valid_tckn(text: &str) -> bool {
    let Some(d) = parse_digits::<TCKN_LENGTH>(text) else {
        return false;
    };

    if d[0] == 0 {
        return false;
    }

    let odd = (d[0] + d[2] + d[4] + d[6] + d[8]) as i32;
    let even = (d[1] + d[3] + d[5] + d[7]) as i32;

    // The difference goes negative for inputs like 19090909018; the residue
    // must still land in 0..=9.
    let digit10 = (odd * 7 - even).rem_euclid(10) as u32;
    let digit11 = (d[..9].iter().sum::<u32>() + digit10) % 10;

    d[9] == digit10 && d[10] == digit11
}

/// Parse exactly `N` ASCII digits, or nothing.
fn parse_digits<const N: usize>(text: &str) -> Option<[u32; N]> {
    let bytes = text.as_bytes();
    if bytes.len() != N {
        return None;
    }

    let mut digits = [0u32; N];
    for (slot, &b) in digits.iter_mut().zip(bytes) {
        if !b.is_ascii_digit() {
            return None;
        }
        *slot = u32::from(b - b'0');
    }
    Some(digits)
}
