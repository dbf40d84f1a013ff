//! Key material derived from the configured passphrase and salt.
use std::fmt;

use scrypt::{scrypt, Params};
use zeroize::Zeroizing;

use crate::error::{Result, SecurityError};

/// AES-256 key length
pub(crate) const ENCRYPTION_KEY_LEN: usize = 32;

// scrypt block size and parallelism; only N is configurable
const KDF_R: u32 = 8;
const KDF_P: u32 = 1;

/// Secret material held by the signing provider.
///
/// The HMAC key is the raw passphrase; the encryption key is stretched from
/// passphrase and salt with scrypt. Both buffers are wiped on drop and
/// nothing here is `Clone`, `Serialize` or printable.
pub struct SecretMaterial {
    hmac_key: Zeroizing<Vec<u8>>,
    encryption_key: Zeroizing<[u8; ENCRYPTION_KEY_LEN]>,
}

impl SecretMaterial {
    /// Derive secret material, failing fast on absent inputs.
    pub fn derive(passphrase: &str, salt: &str, kdf_log_n: u8) -> Result<Self> {
        if passphrase.is_empty() {
            return Err(SecurityError::InvalidArgument("passphrase is empty".into()));
        }
        if salt.is_empty() {
            return Err(SecurityError::InvalidArgument("salt is empty".into()));
        }

        let params = Params::new(kdf_log_n, KDF_R, KDF_P, ENCRYPTION_KEY_LEN)
            .map_err(|e| SecurityError::InvalidArgument(format!("kdf parameters: {e}")))?;

        let mut encryption_key = Zeroizing::new([0u8; ENCRYPTION_KEY_LEN]);
        scrypt(
            passphrase.as_bytes(),
            salt.as_bytes(),
            &params,
            &mut encryption_key[..],
        )
        .map_err(|e| SecurityError::SigningUnavailable(format!("key derivation: {e}")))?;

        Ok(Self {
            hmac_key: Zeroizing::new(passphrase.as_bytes().to_vec()),
            encryption_key,
        })
    }

    pub(crate) fn hmac_key(&self) -> &[u8] {
        &self.hmac_key
    }

    pub(crate) fn encryption_key(&self) -> &[u8] {
        &self.encryption_key[..]
    }
}

impl fmt::Debug for SecretMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretMaterial").finish_non_exhaustive()
    }
}
