// src/common/id_generator.rs
//! Random identifiers in Crockford Base32
//!
//! User ids look like `U_K7NP3XQ2MB`. The alphabet leaves out I, L, O and U,
//! so ids survive being read aloud or retyped.

use rand::Rng;

const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Random characters after the prefix
const ID_LENGTH: usize = 10;

pub const USER_ID_PREFIX: &str = "U";

/// `length` characters drawn from the thread-local CSPRNG.
///
/// Also used for values that must not be guessable, such as the federated
/// password sentinel.
pub fn generate_raw_id(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| CROCKFORD_ALPHABET[rng.gen_range(0..CROCKFORD_ALPHABET.len())] as char)
        .collect()
}

pub fn generate_user_id() -> String {
    format!("{}_{}", USER_ID_PREFIX, generate_raw_id(ID_LENGTH))
}
