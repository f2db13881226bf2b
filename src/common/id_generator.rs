// src/common/id_generator.rs
//! Crockford Base32 ID and token generator
//!
//! Entity IDs are short, human-readable, prefixed strings
//! (e.g. U_K7NP3X for users). CSRF state tokens are longer unprefixed
//! strings from the same alphabet; `thread_rng` is a CSPRNG, so the
//! tokens are unguessable.

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Length of random CSRF state tokens (160 bits)
const TOKEN_LENGTH: usize = 32;

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User (U_)
    User,
}

impl EntityPrefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
        }
    }
}

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed entity ID, e.g. "U_K7NP3X"
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(6))
}

/// Generate an unprefixed opaque token for CSRF state
pub fn generate_token() -> String {
    generate_crockford_string(TOKEN_LENGTH)
}
