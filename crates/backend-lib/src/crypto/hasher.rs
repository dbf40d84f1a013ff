//! Plain, salted and stretched SHA-512 digests.
//!
//! Round 1 hashes `text || salt`. Every further round hashes the previous
//! round's hex digest followed by `text || salt`.
use sha2::{Digest, Sha512};

use crate::error::{Result, SecurityError};

/// Hex SHA-512 of the UTF-8 bytes of `text`
pub fn sha512(text: &str) -> String {
    hex::encode(Sha512::digest(text.as_bytes()))
}

/// Single-round salted digest, same as `sha512_iterated(text, salt, 1)`
pub fn sha512_salted(text: &str, salt: &str) -> Result<String> {
    sha512_iterated(text, salt, 1)
}

/// Salted digest stretched over `iterations` rounds
pub fn sha512_iterated(text: &str, salt: &str, iterations: u32) -> Result<String> {
    if salt.is_empty() {
        return Err(SecurityError::InvalidArgument("salt is empty".into()));
    }
    if iterations == 0 {
        return Err(SecurityError::InvalidArgument(
            "iterations must be at least 1".into(),
        ));
    }

    let mut digest = Sha512::new()
        .chain_update(text.as_bytes())
        .chain_update(salt.as_bytes())
        .finalize();

    for _ in 1..iterations {
        digest = Sha512::new()
            .chain_update(hex::encode(digest).as_bytes())
            .chain_update(text.as_bytes())
            .chain_update(salt.as_bytes())
            .finalize();
    }

    Ok(hex::encode(digest))
}
