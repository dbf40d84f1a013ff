// ============================
// tollgate-backend/src/lib.rs
// ============================
//! Signing, hashing and server-managed sessions for request-handling layers.

pub mod config;
pub mod crypto;
pub mod error;
pub mod metrics;
pub mod session;

use std::sync::Arc;

use tracing::info;

use crate::config::Settings;
use crate::crypto::{CryptoProvider, SigningHashingProvider};
use crate::error::Result;
use crate::session::{spawn_sweeper, SessionRepository, SweeperHandle};

pub use crate::error::SecurityError;

/// Provider and repository shared across request handlers
#[derive(Clone)]
pub struct Tollgate {
    /// Signing and hashing provider
    pub crypto: Arc<dyn CryptoProvider>,
    /// Session repository
    pub sessions: Arc<SessionRepository>,
    /// Settings the components were built from
    pub settings: Arc<Settings>,
}

impl Tollgate {
    /// Build both components from validated settings.
    ///
    /// A `SigningUnavailable` error here means the process cannot sign at
    /// all and should not start.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;

        let crypto = Arc::new(SigningHashingProvider::from_settings(&settings.crypto)?);
        let sessions = Arc::new(SessionRepository::from_settings(&settings.sessions)?);

        info!(
            domain = %sessions.get_domain(),
            active = sessions.is_active(),
            rate_limit = sessions.rate_limit(),
            "tollgate initialised"
        );

        Ok(Self {
            crypto,
            sessions,
            settings: Arc::new(settings),
        })
    }

    /// Build from `tollgate.toml` and the environment
    pub fn new_default() -> Result<Self> {
        Self::new(Settings::load()?)
    }

    /// Start the background expiry sweep at the configured interval
    pub fn spawn_sweeper(&self) -> Result<SweeperHandle> {
        spawn_sweeper(&self.sessions, self.settings.sessions.sweep_interval())
    }
}
