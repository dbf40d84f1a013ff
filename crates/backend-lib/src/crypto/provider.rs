// ============================
// crates/backend-lib/src/crypto/provider.rs
// ============================
//! HMAC signing, bcrypt, AES-GCM text encryption and SHA-512 digests
//! over a single immutable secret.
//!
//! Primitive objects (MAC state, cipher) are built per call from the
//! secret, so concurrent callers never share mutable crypto state and no
//! lock is taken.
use aes_gcm::{
    aead::{Aead, AeadCore, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, error};

use super::{hasher, CryptoProvider, SecretMaterial};
use crate::config::CryptoSettings;
use crate::error::{Result, SecurityError};

type HmacSha256 = Hmac<Sha256>;

/// Nonce size for AES-GCM (96 bits / 12 bytes)
const NONCE_SIZE: usize = 12;

/// AES-GCM authentication tag size
const TAG_SIZE: usize = 16;

/// bcrypt cost used by [`SigningHashingProvider::new`]
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// scrypt `log2(N)` used by [`SigningHashingProvider::new`]
pub const DEFAULT_KDF_LOG_N: u8 = 15;

/// The signing and hashing provider
#[derive(Debug)]
pub struct SigningHashingProvider {
    secret: SecretMaterial,
    bcrypt_cost: u32,
}

impl SigningHashingProvider {
    /// Create a provider with default work factors
    pub fn new(passphrase: &str, salt: &str) -> Result<Self> {
        Self::with_work_factors(passphrase, salt, DEFAULT_BCRYPT_COST, DEFAULT_KDF_LOG_N)
    }

    /// Create a provider from loaded settings
    pub fn from_settings(settings: &CryptoSettings) -> Result<Self> {
        Self::with_work_factors(
            &settings.passphrase,
            &settings.salt,
            settings.bcrypt_cost,
            settings.kdf_log_n,
        )
    }

    /** Create a provider with explicit work factors
    # Arguments
    * `bcrypt_cost` - bcrypt cost factor, 4..=31
    * `kdf_log_n` - scrypt `log2(N)` for the encryption key
    # Errors
    `InvalidArgument` for absent key material or bad factors, `SigningUnavailable`
    if HMAC-SHA256 cannot be keyed. */
    pub fn with_work_factors(
        passphrase: &str,
        salt: &str,
        bcrypt_cost: u32,
        kdf_log_n: u8,
    ) -> Result<Self> {
        if !crate::config::BCRYPT_COST_RANGE.contains(&bcrypt_cost) {
            return Err(SecurityError::InvalidArgument(format!(
                "bcrypt cost {bcrypt_cost} is out of range"
            )));
        }

        let provider = Self {
            secret: SecretMaterial::derive(passphrase, salt, kdf_log_n)?,
            bcrypt_cost,
        };

        // Surface a missing MAC primitive at startup rather than on first use
        provider.mac()?;

        debug!(bcrypt_cost, kdf_log_n, "signing provider initialised");
        Ok(provider)
    }

    fn mac(&self) -> Result<HmacSha256> {
        <HmacSha256 as Mac>::new_from_slice(self.secret.hmac_key()).map_err(|e| {
            error!("HmacSHA256 unavailable: {e}");
            SecurityError::SigningUnavailable(format!("HmacSHA256: {e}"))
        })
    }

    fn cipher(&self) -> Result<Aes256Gcm> {
        Aes256Gcm::new_from_slice(self.secret.encryption_key())
            .map_err(|e| SecurityError::SigningUnavailable(format!("AES-256-GCM: {e}")))
    }
}

impl CryptoProvider for SigningHashingProvider {
    fn make_signature(&self, text: &str) -> Result<String> {
        let mut mac = self.mac()?;
        mac.update(text.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn test_signature(&self, text: &str, candidate: &str) -> Result<bool> {
        let expected = self.make_signature(text)?;
        Ok(constant_time_eq(expected.as_bytes(), candidate.as_bytes()))
    }

    fn make_bcrypt(&self, text: &str) -> Result<String> {
        bcrypt::hash(text, self.bcrypt_cost)
            .map_err(|e| SecurityError::SigningUnavailable(format!("bcrypt: {e}")))
    }

    fn test_bcrypt(&self, text: &str, hash: &str) -> bool {
        match bcrypt::verify(text, hash) {
            Ok(matched) => matched,
            Err(e) => {
                debug!("rejecting malformed bcrypt hash: {e}");
                false
            },
        }
    }

    fn encrypt(&self, text: &str) -> Result<String> {
        let cipher = self.cipher()?;
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);

        let ciphertext = cipher
            .encrypt(&nonce, text.as_bytes())
            .map_err(|_| SecurityError::SigningUnavailable("AES-256-GCM encryption failed".into()))?;

        // Combine nonce and encrypted data
        let mut combined = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        combined.extend_from_slice(&nonce);
        combined.extend_from_slice(&ciphertext);

        Ok(hex::encode(combined))
    }

    fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let combined = hex::decode(ciphertext).map_err(|_| SecurityError::DecryptionFailed)?;
        if combined.len() < NONCE_SIZE + TAG_SIZE {
            return Err(SecurityError::DecryptionFailed);
        }

        let (nonce, body) = combined.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher()?
            .decrypt(Nonce::from_slice(nonce), body)
            .map_err(|_| SecurityError::DecryptionFailed)?;

        String::from_utf8(plaintext).map_err(|_| SecurityError::DecryptionFailed)
    }

    fn sha512(&self, text: &str) -> String {
        hasher::sha512(text)
    }

    fn sha512_salted(&self, text: &str, salt: &str) -> Result<String> {
        hasher::sha512_salted(text, salt)
    }

    fn sha512_iterated(&self, text: &str, salt: &str, iterations: u32) -> Result<String> {
        hasher::sha512_iterated(text, salt, iterations)
    }
}

/// Constant-time byte slice comparison.
///
/// Length is not secret, so a length mismatch returns early.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter()
        .zip(b.iter())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
