// ============================
// crates/backend-lib/src/crypto/token.rs
// ============================
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
/** Secure token generation for session identifiers
Tokens come from the thread-local CSPRNG, which is seeded from the OS. */
use rand::RngCore;
use tollgate_common::SessionId;

/// Default token size in bytes (32 bytes = 256 bits of entropy)
const DEFAULT_TOKEN_BYTES: usize = 32;

/** Generate a fresh session identifier
# Returns
A base64 URL-safe encoded 256-bit token without padding */
pub fn generate_session_id() -> SessionId {
    SessionId::new(generate_secure_token_with_size(DEFAULT_TOKEN_BYTES))
}

/** Generate a cryptographically secure random token with specified size
# Arguments
* `bytes` - The size of the random token in bytes */
pub fn generate_secure_token_with_size(bytes: usize) -> String {
    let mut buffer = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buffer);
    URL_SAFE_NO_PAD.encode(buffer)
}
