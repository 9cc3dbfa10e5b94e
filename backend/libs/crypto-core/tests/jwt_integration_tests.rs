/// Integration tests for crypto-core
///
/// Exercises the public API the services rely on: issuing an access token,
/// validating it, and pairing it with a stored refresh-token hash.
use crypto_core::{hash, jwt, password, token};
use std::sync::Once;

fn init_test_secret() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        jwt::initialize_jwt_secret("integration-test-secret-with-enough-length")
            .expect("Failed to initialize JWT secret");
    });
}

#[test]
fn test_login_flow_primitives() {
    init_test_secret();

    let stored = password::hash_password("password123").expect("hash");
    assert!(password::verify_password("password123", &stored).expect("verify"));

    let access = jwt::generate_access_token(12).expect("access token");
    assert_eq!(jwt::get_user_id_from_token(&access).expect("user id"), 12);

    let refresh = token::generate_refresh_token();
    let digest = hash::hash_token(&refresh);
    assert_eq!(digest, hash::hash_token(&refresh));
    assert_ne!(digest, refresh);
}

#[test]
fn test_uninitialized_secret_is_reported_once_initialized() {
    init_test_secret();
    assert!(jwt::is_initialized());
    assert!(jwt::initialize_jwt_secret("second").is_err());
}

#[test]
fn test_validate_rejects_garbage() {
    init_test_secret();

    assert!(jwt::validate_token("").is_err());
    assert!(jwt::validate_token("a.b.c").is_err());
}
