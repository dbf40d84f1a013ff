// ===========================
// tests/unit/hashing_tests.rs
// ===========================
//! bcrypt and SHA-512 behavior through the provider
use crate::test_utils::test_provider;
use backend_lib::crypto::CryptoProvider;

#[test]
fn test_bcrypt_round_trip_with_fresh_salt() {
    let provider = test_provider();
    let first = provider.make_bcrypt("correct horse").unwrap();
    let second = provider.make_bcrypt("correct horse").unwrap();

    assert_ne!(first, second);
    assert!(first.starts_with("$2"));
    assert!(provider.test_bcrypt("correct horse", &first));
    assert!(provider.test_bcrypt("correct horse", &second));
    assert!(!provider.test_bcrypt("battery staple", &first));
}

#[test]
fn test_bcrypt_hash_is_portable_across_providers() {
    // The salt and cost live in the hash, not in the provider
    let hash = test_provider().make_bcrypt("pw").unwrap();
    let other = backend_lib::crypto::SigningHashingProvider::with_work_factors(
        "another passphrase",
        "another salt",
        4,
        4,
    )
    .unwrap();
    assert!(other.test_bcrypt("pw", &hash));
}

#[test]
fn test_sha512_properties() {
    let provider = test_provider();

    assert_eq!(provider.sha512("text"), provider.sha512("text"));
    assert_eq!(provider.sha512("text").len(), 128);

    let salt_a = provider.sha512_salted("text", "salt-a").unwrap();
    let salt_b = provider.sha512_salted("text", "salt-b").unwrap();
    assert_ne!(salt_a, salt_b);
    assert_ne!(salt_a, provider.sha512("text"));

    let once = provider.sha512_iterated("text", "salt-a", 1).unwrap();
    let many = provider.sha512_iterated("text", "salt-a", 1000).unwrap();
    assert_eq!(once, salt_a);
    assert_ne!(once, many);
    assert_eq!(many, provider.sha512_iterated("text", "salt-a", 1000).unwrap());
}
