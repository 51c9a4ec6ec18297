//! Deterministic seed mixing.
//!
//! Not cryptographic. Used to derive independent, reproducible RNG streams from one
//! configured seed (e.g. one stream per call in the shared bandit).

/// Derive a well-diffused 64-bit seed for `stream` under `seed`.
#[must_use]
pub fn mix_seed(seed: u64, stream: u64) -> u64 {
    splitmix64(seed ^ splitmix64(stream))
}

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
