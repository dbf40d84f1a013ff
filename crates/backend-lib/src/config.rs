// ============================
// tollgate-backend/src/config.rs
// ============================
//! Configuration management.
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tollgate_common::{MAX_RATE_LIMIT, MIN_RATE_LIMIT};

use crate::error::{Result, SecurityError};

/// Config file read by [`Settings::load`]
pub const DEFAULT_CONFIG_FILE: &str = "tollgate.toml";

/// Environment prefix; nested keys are separated by `__`
pub const ENV_PREFIX: &str = "TOLLGATE_";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// bcrypt cost factors accepted by the hasher
pub const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log level
    pub log_level: String,
    /// Signing, hashing and encryption settings
    pub crypto: CryptoSettings,
    /// Session repository settings
    pub sessions: SessionSettings,
}

/// Key material and work factors for the signing provider
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoSettings {
    /// Passphrase the secret material is derived from
    pub passphrase: String,
    /// Salt for the encryption key derivation
    pub salt: String,
    /// bcrypt cost factor
    pub bcrypt_cost: u32,
    /// scrypt `log2(N)` used when deriving the encryption key
    pub kdf_log_n: u8,
}

/// Session repository settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Logical scope stamped on every session
    pub domain: String,
    /// Idle time after which an untouched session expires
    pub max_idle_secs: u64,
    /// Period of the background expiry sweep
    pub sweep_interval_secs: u64,
    /// Session creations admitted per second
    pub rate_limit: f64,
    /// Whether new sessions are admitted at startup
    pub active: bool,
    /// Role names per user
    pub roles: HashMap<String, Vec<String>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            crypto: CryptoSettings::default(),
            sessions: SessionSettings::default(),
        }
    }
}

impl Default for CryptoSettings {
    fn default() -> Self {
        Self {
            passphrase: String::new(),
            salt: String::new(),
            bcrypt_cost: 10,
            kdf_log_n: 15,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            domain: "default".to_string(),
            max_idle_secs: 30 * 60,
            sweep_interval_secs: 60,
            rate_limit: MAX_RATE_LIMIT,
            active: true,
            roles: HashMap::new(),
        }
    }
}

impl fmt::Debug for CryptoSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CryptoSettings")
            .field("passphrase", &"<redacted>")
            .field("salt", &"<redacted>")
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("kdf_log_n", &self.kdf_log_n)
            .finish()
    }
}

impl SessionSettings {
    pub fn max_idle(&self) -> Duration {
        Duration::from_secs(self.max_idle_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Settings {
    /// Load settings from `tollgate.toml` and `TOLLGATE_*` environment variables
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load settings from an explicit file, then the environment
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings: Settings = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that the settings can be used to build a provider and repository
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            return Err(SecurityError::Config(format!(
                "unknown log level '{}'",
                self.log_level
            )));
        }
        if self.crypto.passphrase.is_empty() {
            return Err(SecurityError::Config("crypto.passphrase is required".into()));
        }
        if self.crypto.salt.is_empty() {
            return Err(SecurityError::Config("crypto.salt is required".into()));
        }
        if !BCRYPT_COST_RANGE.contains(&self.crypto.bcrypt_cost) {
            return Err(SecurityError::Config(format!(
                "crypto.bcrypt_cost must be within {BCRYPT_COST_RANGE:?}"
            )));
        }
        if !(1..=20).contains(&self.crypto.kdf_log_n) {
            return Err(SecurityError::Config(
                "crypto.kdf_log_n must be within 1..=20".into(),
            ));
        }
        if self.sessions.domain.trim().is_empty() {
            return Err(SecurityError::Config("sessions.domain is required".into()));
        }
        if self.sessions.max_idle_secs == 0 {
            return Err(SecurityError::Config("sessions.max_idle_secs must be > 0".into()));
        }
        if self.sessions.sweep_interval_secs == 0 {
            return Err(SecurityError::Config(
                "sessions.sweep_interval_secs must be > 0".into(),
            ));
        }
        let rate = self.sessions.rate_limit;
        if !(MIN_RATE_LIMIT..=MAX_RATE_LIMIT).contains(&rate) {
            return Err(SecurityError::Config(format!(
                "sessions.rate_limit {rate} is outside {MIN_RATE_LIMIT}..={MAX_RATE_LIMIT}"
            )));
        }
        Ok(())
    }
}
