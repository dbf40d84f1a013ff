// ============================
// tollgate-backend/src/crypto/mod.rs
// ============================
//! Signing and hashing.

pub mod hasher;
pub mod provider;
pub mod secret;
mod service;
pub mod token;

pub use provider::SigningHashingProvider;
pub use secret::SecretMaterial;
pub use service::CryptoProvider;
pub use token::generate_session_id;
