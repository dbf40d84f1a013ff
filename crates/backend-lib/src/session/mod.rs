// ============================
// tollgate-backend/src/session/mod.rs
// ============================
//! Session storage, admission and expiry.

pub mod entity;
pub mod rate_limit;
pub mod repository;
pub mod roles;
pub mod sweeper;

pub use entity::Session;
pub use rate_limit::CreationRateLimiter;
pub use repository::SessionRepository;
pub use roles::{InMemoryRoleDirectory, RoleDirectory};
pub use sweeper::{spawn_sweeper, SweeperHandle};
