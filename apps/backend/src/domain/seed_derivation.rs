//! Seed derivation for reproducible sessions.
//!
//! A session stores one `rng_seed`. Its direction map and its deck each get
//! their own derived seed so regenerating one never shifts the other.

/// SplitMix64 finalizer; spreads nearby inputs across the whole u64 range.
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Seed for generating the session's direction map.
pub fn derive_direction_seed(session_seed: i64) -> u64 {
    mix((session_seed as u64) ^ 0x4449_5245_4354_494F)
}

/// Seed for dealing the session's deck.
pub fn derive_deck_seed(session_seed: i64) -> u64 {
    mix((session_seed as u64) ^ 0x4445_434B_5345_4544)
}
