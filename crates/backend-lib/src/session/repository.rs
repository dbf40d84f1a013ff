// ============================
// crates/backend-lib/src/session/repository.rs
// ============================
//! Server-managed session storage.
//!
//! Sessions live in a sharded concurrent map keyed by id. Operations on
//! different ids only contend when they hash to the same shard, and every
//! shard lock is held for a bounded, in-memory step. A session is inserted
//! fully built, so readers never see a partial one.
//!
//! Expiry is checked at three points: the background sweep, `find_by_id`,
//! and `touch`. All three remove through `remove_if` with the expiry
//! predicate re-evaluated under the shard lock, so a touch that lands
//! between a sweep's scan and its removal keeps the session alive.
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use metrics::{counter, gauge};
use serde_json::Value;
use tollgate_common::{
    property, Descriptor, RateLimitAdjustment, SessionId, MAX_RATE_LIMIT, MIN_RATE_LIMIT,
    USER_ATTRIBUTE,
};
use tracing::{debug, info, warn};

use super::entity::{idle_delta, Session};
use super::rate_limit::CreationRateLimiter;
use super::roles::{InMemoryRoleDirectory, RoleDirectory};
use crate::config::SessionSettings;
use crate::crypto::generate_session_id;
use crate::error::{Result, SecurityError};
use crate::metrics::{
    SESSION_ACTIVE, SESSION_CREATED, SESSION_DELETED, SESSION_EXPIRED, SESSION_REJECTED,
};

/// Repository of live sessions
pub struct SessionRepository {
    domain: String,
    max_idle: TimeDelta,
    sessions: DashMap<SessionId, Session>,
    active: AtomicBool,
    rate_limiter: CreationRateLimiter,
    roles: Arc<dyn RoleDirectory>,
}

impl std::fmt::Debug for SessionRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRepository")
            .field("domain", &self.domain)
            .field("max_idle", &self.max_idle)
            .field("sessions", &self.sessions.len())
            .field("active", &self.is_active())
            .field("rate_limit", &self.rate_limit())
            .finish_non_exhaustive()
    }
}

impl SessionRepository {
    /// Create an active repository with the maximum rate limit and no roles
    pub fn new(domain: impl Into<String>, max_idle: Duration) -> Result<Self> {
        let domain = domain.into();
        if domain.trim().is_empty() {
            return Err(SecurityError::InvalidArgument("domain is empty".into()));
        }
        let max_idle = idle_delta(max_idle).ok_or_else(|| {
            SecurityError::InvalidArgument("max idle duration must be positive".into())
        })?;

        Ok(Self {
            domain,
            max_idle,
            sessions: DashMap::new(),
            active: AtomicBool::new(true),
            rate_limiter: CreationRateLimiter::new(MAX_RATE_LIMIT),
            roles: Arc::new(InMemoryRoleDirectory::new()),
        })
    }

    /// Create a repository from loaded settings, seeding roles from config
    pub fn from_settings(settings: &SessionSettings) -> Result<Self> {
        let repository = Self::new(settings.domain.clone(), settings.max_idle())?
            .with_role_directory(Arc::new(InMemoryRoleDirectory::from_map(&settings.roles)));
        repository.set_rate_limit(settings.rate_limit)?;
        repository.set_active(settings.active);
        Ok(repository)
    }

    /// Resolve roles through `roles` instead of the built-in empty directory
    pub fn with_role_directory(mut self, roles: Arc<dyn RoleDirectory>) -> Self {
        self.roles = roles;
        self
    }

    pub fn get_domain(&self) -> &str {
        &self.domain
    }

    /// Whether new sessions are admitted. Existing sessions are unaffected.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn set_active(&self, active: bool) {
        let previous = self.active.swap(active, Ordering::AcqRel);
        if previous != active {
            info!(domain = %self.domain, active, "session repository admission changed");
        }
    }

    /// Current creation limit in sessions per second
    pub fn rate_limit(&self) -> f64 {
        self.rate_limiter.limit()
    }

    /// Replace the creation limit, clamping into `[MIN_RATE_LIMIT, MAX_RATE_LIMIT]`.
    ///
    /// Returns the value actually applied. NaN and infinities are rejected
    /// with `RateLimitOutOfRange` and leave the current limit in place.
    pub fn set_rate_limit(&self, limit: f64) -> Result<f64> {
        let adjustment = RateLimitAdjustment::for_request(limit);
        match adjustment {
            RateLimitAdjustment::Accepted(_) => {},
            RateLimitAdjustment::Clamped { requested, applied } => {
                warn!(requested, applied, "rate limit out of range, clamped");
            },
            RateLimitAdjustment::Rejected(requested) => {
                warn!(requested, "rate limit is not a finite number, rejected");
                return Err(SecurityError::RateLimitOutOfRange(requested));
            },
        }

        let applied = adjustment
            .applied()
            .ok_or(SecurityError::RateLimitOutOfRange(limit))?;
        self.rate_limiter.set_limit(applied);
        Ok(applied)
    }

    /// Role names for `user`; empty if the user has none
    pub fn get_roles_for_user(&self, user: &str) -> Vec<String> {
        self.roles.roles_for_user(user)
    }

    /// Read-only snapshot of repository configuration
    pub fn get_properties(&self) -> BTreeMap<String, Value> {
        BTreeMap::from([
            (property::DOMAIN.to_string(), Value::from(self.domain.clone())),
            (property::ACTIVE.to_string(), Value::from(self.is_active())),
            (property::RATE_LIMIT.to_string(), Value::from(self.rate_limit())),
            (property::MIN_RATE_LIMIT.to_string(), Value::from(MIN_RATE_LIMIT)),
            (property::MAX_RATE_LIMIT.to_string(), Value::from(MAX_RATE_LIMIT)),
            (
                property::MAX_IDLE_SECS.to_string(),
                Value::from(self.max_idle.num_seconds()),
            ),
            (property::SESSION_COUNT.to_string(), Value::from(self.len())),
        ])
    }

    /// Create a session seeded with `descriptor` as its attributes.
    ///
    /// Roles are resolved from the descriptor's `user` attribute when present.
    pub fn create_session(&self, descriptor: Descriptor) -> Result<Session> {
        if !self.is_active() {
            counter!(SESSION_REJECTED).increment(1);
            warn!(domain = %self.domain, "session creation refused: repository inactive");
            return Err(SecurityError::RepositoryInactive);
        }
        if !self.rate_limiter.try_acquire() {
            counter!(SESSION_REJECTED).increment(1);
            warn!(domain = %self.domain, "session creation refused: rate limit exceeded");
            return Err(SecurityError::RateLimited);
        }

        let roles: BTreeSet<String> = descriptor
            .get(USER_ATTRIBUTE)
            .and_then(Value::as_str)
            .map(|user| self.roles.roles_for_user(user).into_iter().collect())
            .unwrap_or_default();
        let attributes: HashMap<String, Value> = descriptor.into_iter().collect();

        let mut session = Session::new(
            generate_session_id(),
            self.domain.clone(),
            attributes,
            roles,
            self.max_idle,
            Utc::now(),
        );

        loop {
            match self.sessions.entry(session.id().clone()) {
                Entry::Vacant(slot) => {
                    slot.insert(session.clone());
                    break;
                },
                Entry::Occupied(_) => {
                    warn!("session id collision, regenerating");
                    session.regenerate_id(generate_session_id());
                },
            }
        }

        counter!(SESSION_CREATED).increment(1);
        gauge!(SESSION_ACTIVE).set(self.sessions.len() as f64);
        debug!(domain = %self.domain, roles = session.roles().len(), "session created");

        Ok(session)
    }

    /// Snapshot of a live session; an expired one is removed and not returned
    pub fn find_by_id(&self, id: &str) -> Option<Session> {
        self.find_by_id_at(id, Utc::now())
    }

    pub fn find_by_id_at(&self, id: &str, now: DateTime<Utc>) -> Option<Session> {
        {
            let session = self.sessions.get(id)?;
            if !session.is_expired_at(now) {
                return Some(session.value().clone());
            }
        }
        self.expire(id, now);
        None
    }

    /// Keep a session alive by resetting its last access time.
    ///
    /// Idle windows are measured on the wall clock; a forward clock jump
    /// larger than `max_idle` expires every session at the next check.
    pub fn touch(&self, id: &str) -> Result<()> {
        self.touch_at(id, Utc::now())
    }

    pub fn touch_at(&self, id: &str, now: DateTime<Utc>) -> Result<()> {
        self.with_live_session(id, now, |session| session.touch_at(now))
    }

    /// Write back the attributes of an edited session copy
    pub fn save(&self, session: &Session) -> Result<()> {
        let attributes = session.attributes().clone();
        self.with_live_session(session.id().as_str(), Utc::now(), move |stored| {
            stored.replace_attributes(attributes)
        })
    }

    pub fn set_attribute(&self, id: &str, key: impl Into<String>, value: Value) -> Result<()> {
        let key = key.into();
        self.with_live_session(id, Utc::now(), move |session| {
            session.set_attribute(key, value);
        })
    }

    pub fn remove_attribute(&self, id: &str, key: &str) -> Result<Option<Value>> {
        self.with_live_session(id, Utc::now(), |session| session.remove_attribute(key))
    }

    /// Change how long a single session may stay idle
    pub fn set_max_idle(&self, id: &str, max_idle: Duration) -> Result<()> {
        let max_idle = idle_delta(max_idle).ok_or_else(|| {
            SecurityError::InvalidArgument("max idle duration must be positive".into())
        })?;
        self.with_live_session(id, Utc::now(), |session| session.set_max_idle(max_idle))
    }

    /// Remove a session; returns whether it existed
    pub fn delete_by_id(&self, id: &str) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            counter!(SESSION_DELETED).increment(1);
            gauge!(SESSION_ACTIVE).set(self.sessions.len() as f64);
        }
        removed
    }

    /// Remove every session whose idle window has elapsed; returns how many
    pub fn clean_expired_sessions(&self) -> usize {
        self.clean_expired_sessions_at(Utc::now())
    }

    pub fn clean_expired_sessions_at(&self, now: DateTime<Utc>) -> usize {
        // Collect first so no shard guard is held while removing.
        let candidates: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|entry| entry.value().is_expired_at(now))
            .map(|entry| entry.key().clone())
            .collect();

        let removed = candidates
            .iter()
            .filter(|id| self.expire(id.as_str(), now))
            .count();

        if removed > 0 {
            info!(
                domain = %self.domain,
                removed,
                remaining = self.sessions.len(),
                "expired sessions swept"
            );
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    fn with_live_session<T>(
        &self,
        id: &str,
        now: DateTime<Utc>,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T> {
        {
            let mut session = self
                .sessions
                .get_mut(id)
                .ok_or_else(|| SecurityError::UnknownSession(id.to_string()))?;
            if !session.is_expired_at(now) {
                return Ok(f(session.value_mut()));
            }
        }
        self.expire(id, now);
        Err(SecurityError::UnknownSession(id.to_string()))
    }

    fn expire(&self, id: &str, now: DateTime<Utc>) -> bool {
        let removed = self
            .sessions
            .remove_if(id, |_, session| session.is_expired_at(now))
            .is_some();
        if removed {
            counter!(SESSION_EXPIRED).increment(1);
            gauge!(SESSION_ACTIVE).set(self.sessions.len() as f64);
        }
        removed
    }
}
