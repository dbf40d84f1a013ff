// ==============
// crates/backend-lib/src/metrics.rs

//! Central place for metric keys
pub const SESSION_CREATED: &str = "session.created";
pub const SESSION_EXPIRED: &str = "session.expired";
pub const SESSION_DELETED: &str = "session.deleted";
pub const SESSION_REJECTED: &str = "session.rejected";
pub const SESSION_ACTIVE: &str = "session.active";
