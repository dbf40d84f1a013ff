use crate::error::Result;

/// Signing, password hashing, reversible encryption and digests keyed by
/// one immutable secret. Every method is safe to call from many threads.
pub trait CryptoProvider: Send + Sync {
    /// Lowercase hex HMAC-SHA256 of `text`
    fn make_signature(&self, text: &str) -> Result<String>;
    /// Whether `candidate` is exactly the signature of `text`
    fn test_signature(&self, text: &str, candidate: &str) -> Result<bool>;
    /// Freshly salted bcrypt hash of `text`
    fn make_bcrypt(&self, text: &str) -> Result<String>;
    /// Whether `text` matches `hash`; malformed hashes never match
    fn test_bcrypt(&self, text: &str, hash: &str) -> bool;
    fn encrypt(&self, text: &str) -> Result<String>;
    fn decrypt(&self, ciphertext: &str) -> Result<String>;
    fn sha512(&self, text: &str) -> String;
    fn sha512_salted(&self, text: &str, salt: &str) -> Result<String>;
    fn sha512_iterated(&self, text: &str, salt: &str, iterations: u32) -> Result<String>;
}
