//! Room join codes.
//!
//! Codes are six characters of Crockford's Base32 alphabet. Input is NFKC
//! normalized first, so full-width characters typed through a Japanese IME
//! match their ASCII forms.

use rand::Rng;
use unicode_normalization::UnicodeNormalization;

const CROCKFORD: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ"; // no I, L, O, U

pub const ROOM_CODE_LEN: usize = 6;

/// Generate a code from the OS-seeded thread RNG.
pub fn generate_room_code() -> String {
    generate_room_code_with(&mut rand::rng())
}

pub fn generate_room_code_with<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ROOM_CODE_LEN)
        .map(|_| CROCKFORD[rng.random_range(0..CROCKFORD.len())] as char)
        .collect()
}

/// Canonical form of user-typed code, or `None` if it cannot be one.
///
/// Separators are dropped, case is folded, and the Crockford look-alikes
/// `I`/`L` and `O` decode as `1` and `0`.
pub fn normalize_room_code(input: &str) -> Option<String> {
    let code: String = input
        .nfkc()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .map(|c| match c.to_ascii_uppercase() {
            'I' | 'L' => '1',
            'O' => '0',
            other => other,
        })
        .collect();

    let valid = code.len() == ROOM_CODE_LEN && code.bytes().all(|b| CROCKFORD.contains(&b));
    valid.then_some(code)
}
