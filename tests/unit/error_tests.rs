// =========================
// tests/unit/error_tests.rs
// =========================
//! Error kinds surfaced across the public API
use crate::test_utils::{descriptor, test_provider, test_tollgate};
use backend_lib::crypto::{CryptoProvider, SigningHashingProvider};
use backend_lib::SecurityError;
use serde_json::json;

#[test]
fn test_missing_key_material_is_invalid_argument() {
    let err = SigningHashingProvider::new("", "salt").unwrap_err();
    assert!(matches!(err, SecurityError::InvalidArgument(_)));
    assert_eq!(err.error_code(), "ARG_001");
    assert!(!err.is_fatal());
}

#[test]
fn test_decryption_failure_kind() {
    let err = test_provider().decrypt("00ff").unwrap_err();
    assert!(matches!(err, SecurityError::DecryptionFailed));
    assert_eq!(err.error_code(), "CRYPT_001");
}

#[test]
fn test_repository_errors() {
    let tollgate = test_tollgate();

    let err = tollgate.sessions.touch("no-such-session").unwrap_err();
    assert!(matches!(err, SecurityError::UnknownSession(_)));
    assert_eq!(err.sanitized_message(), "Session not found");

    tollgate.sessions.set_active(false);
    let err = tollgate
        .sessions
        .create_session(descriptor(json!({"user": "alice"})))
        .unwrap_err();
    assert!(matches!(err, SecurityError::RepositoryInactive));
    assert_eq!(err.error_code(), "SESS_001");

    let err = tollgate.sessions.set_rate_limit(f64::INFINITY).unwrap_err();
    assert!(matches!(err, SecurityError::RateLimitOutOfRange(_)));
}
