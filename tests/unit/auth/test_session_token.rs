// Unit tests for session token hashing

use go_eats::auth::session_token::{SessionToken, SessionTokenHash};

#[test]
fn test_generated_token_is_64_hex_chars() {
    let token = SessionToken::generate();
    let raw = token.expose_secret();

    assert_eq!(raw.len(), 64);
    assert!(raw.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_token_hash_matches_hash_of_raw_value() {
    let token = SessionToken::generate();
    let parsed = SessionToken::new(token.expose_secret());

    assert_eq!(token.hash(), parsed.hash());
    assert_eq!(token.hash(), SessionTokenHash::from_token(token.expose_secret()));
}

#[test]
fn test_hash_never_equals_token() {
    let token = SessionToken::new("abc123");
    assert_ne!(token.hash().as_str(), "abc123");
    assert_eq!(token.hash().as_str().len(), 64);
}

#[test]
fn test_known_sha256_digest() {
    let hash = SessionTokenHash::from_token("abc");
    assert_eq!(
        hash.as_str(),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(hash.to_string(), hash.as_str());
}

#[test]
fn test_hash_string_round_trip() {
    let hash = SessionTokenHash::from_token("abc");
    let restored = SessionTokenHash::from_hash_string(hash.as_str()).unwrap();
    assert_eq!(hash, restored);

    assert!(SessionTokenHash::from_hash_string("xyz").is_err());
    assert!(SessionTokenHash::from_hash_string(&"g".repeat(64)).is_err());
}

#[test]
fn test_token_is_redacted_in_output() {
    let token = SessionToken::new("very-secret-token");

    assert!(!format!("{:?}", token).contains("very-secret-token"));
    assert!(!format!("{}", token).contains("very-secret-token"));
}
