// ================
// common/src/lib.rs
// ================
//! Common types shared by the `tollgate` crates.
//! Nothing in here touches key material or shared state; it is the
//! vocabulary the session repository and its callers agree on.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Lowest admissible repository rate limit
pub const MIN_RATE_LIMIT: f64 = 0.1;

/// Highest admissible repository rate limit
pub const MAX_RATE_LIMIT: f64 = 2000.0;

/// Structured key/value input used to seed a new session's attributes
pub type Descriptor = serde_json::Map<String, serde_json::Value>;

/// Keys exposed by the repository properties snapshot
pub mod property {
    pub const DOMAIN: &str = "domain";
    pub const ACTIVE: &str = "active";
    pub const RATE_LIMIT: &str = "rate_limit";
    pub const MIN_RATE_LIMIT: &str = "min_rate_limit";
    pub const MAX_RATE_LIMIT: &str = "max_rate_limit";
    pub const MAX_IDLE_SECS: &str = "max_idle_secs";
    pub const SESSION_COUNT: &str = "session_count";
}

/// Descriptor attribute naming the session's principal
pub const USER_ATTRIBUTE: &str = "user";

/// Unique, immutable session identifier
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<String> for SessionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Outcome of bringing a requested rate limit into bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateLimitAdjustment {
    /// Value was already inside `[MIN_RATE_LIMIT, MAX_RATE_LIMIT]`
    Accepted(f64),
    /// Value was outside the bounds and has been pulled back to the nearest one
    Clamped { requested: f64, applied: f64 },
    /// Value is NaN or infinite and cannot be clamped meaningfully
    Rejected(f64),
}

impl RateLimitAdjustment {
    /// Bounds-check a requested limit.
    pub fn for_request(requested: f64) -> Self {
        if !requested.is_finite() {
            return Self::Rejected(requested);
        }
        let applied = requested.clamp(MIN_RATE_LIMIT, MAX_RATE_LIMIT);
        if applied == requested {
            Self::Accepted(applied)
        } else {
            Self::Clamped { requested, applied }
        }
    }

    /// The value that will be stored, if any
    pub fn applied(&self) -> Option<f64> {
        match *self {
            Self::Accepted(v) => Some(v),
            Self::Clamped { applied, .. } => Some(applied),
            Self::Rejected(_) => None,
        }
    }
}
