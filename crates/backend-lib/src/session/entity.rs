// ============================
// crates/backend-lib/src/session/entity.rs
// ============================
//! A single authenticated client interaction.
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;
use tollgate_common::SessionId;

/// Session information
///
/// `id`, `domain` and `created_at` never change. `last_accessed` only moves
/// through the repository's touch. Attributes may be edited on a copy and
/// written back with `SessionRepository::save`.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: SessionId,
    domain: String,
    attributes: HashMap<String, Value>,
    roles: BTreeSet<String>,
    created_at: DateTime<Utc>,
    last_accessed: DateTime<Utc>,
    max_idle: TimeDelta,
}

impl Session {
    pub(crate) fn new(
        id: SessionId,
        domain: String,
        attributes: HashMap<String, Value>,
        roles: BTreeSet<String>,
        max_idle: TimeDelta,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            domain,
            attributes,
            roles,
            created_at: now,
            last_accessed: now,
            max_idle,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn attributes(&self) -> &HashMap<String, Value> {
        &self.attributes
    }

    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    pub fn set_attribute(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.attributes.insert(key.into(), value)
    }

    pub fn remove_attribute(&mut self, key: &str) -> Option<Value> {
        self.attributes.remove(key)
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_accessed(&self) -> DateTime<Utc> {
        self.last_accessed
    }

    pub fn max_idle(&self) -> TimeDelta {
        self.max_idle
    }

    /// Instant at which the session becomes eligible for removal, or `None`
    /// if the idle window overflows the calendar.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.last_accessed.checked_add_signed(self.max_idle)
    }

    /// `last_accessed + max_idle <= now`, compared as wall-clock time.
    /// `touch_at` never moves `last_accessed` back, but a forward jump of
    /// the system clock can put every deadline in the past at once.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|deadline| deadline <= now)
    }

    pub(crate) fn touch_at(&mut self, now: DateTime<Utc>) {
        if now > self.last_accessed {
            self.last_accessed = now;
        }
    }

    pub(crate) fn set_max_idle(&mut self, max_idle: TimeDelta) {
        self.max_idle = max_idle;
    }

    pub(crate) fn replace_attributes(&mut self, attributes: HashMap<String, Value>) {
        self.attributes = attributes;
    }

    pub(crate) fn regenerate_id(&mut self, id: SessionId) {
        self.id = id;
    }
}

/// Convert an idle window to the calendar delta used for expiry checks
pub(crate) fn idle_delta(max_idle: Duration) -> Option<TimeDelta> {
    TimeDelta::from_std(max_idle).ok().filter(|d| *d > TimeDelta::zero())
}
