// ==============================
// tests/unit/rate_limit_tests.rs
// ==============================
//! Validate the repository rate limit bounds and admission
use crate::test_utils::test_tollgate;
use backend_lib::SecurityError;
use tollgate_common::{Descriptor, MAX_RATE_LIMIT, MIN_RATE_LIMIT};

#[test]
fn test_rate_limit_never_exceeds_bounds() {
    let tollgate = test_tollgate();

    tollgate.sessions.set_rate_limit(5000.0).unwrap();
    assert!(tollgate.sessions.rate_limit() <= MAX_RATE_LIMIT);

    tollgate.sessions.set_rate_limit(0.01).unwrap();
    assert!(tollgate.sessions.rate_limit() >= MIN_RATE_LIMIT);

    tollgate.sessions.set_rate_limit(-3.0).unwrap();
    assert_eq!(tollgate.sessions.rate_limit(), MIN_RATE_LIMIT);
}

#[test]
fn test_rate_limit_in_range_is_kept() {
    let tollgate = test_tollgate();
    assert_eq!(tollgate.sessions.set_rate_limit(250.5).unwrap(), 250.5);
    assert_eq!(tollgate.sessions.rate_limit(), 250.5);
}

#[test]
fn test_low_rate_limit_throttles_creation() {
    let tollgate = test_tollgate();
    tollgate.sessions.set_rate_limit(1.0).unwrap();

    assert!(tollgate.sessions.create_session(Descriptor::new()).is_ok());
    assert!(matches!(
        tollgate.sessions.create_session(Descriptor::new()),
        Err(SecurityError::RateLimited)
    ));
    assert_eq!(tollgate.sessions.len(), 1);
}
