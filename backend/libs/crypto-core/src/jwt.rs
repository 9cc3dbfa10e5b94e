/// Shared JWT module for SNS services
///
/// Access tokens are HS256-signed with a single shared secret. Both the public
/// API and the admin API issue and validate tokens through this module so the
/// two surfaces agree on claims and algorithm.
///
/// ## Usage
///
/// Services must call `initialize_jwt_secret()` during startup before any JWT operations:
///
/// ```rust,no_run
/// use crypto_core::jwt;
///
/// let secret = std::env::var("JWT_SECRET").expect("JWT_SECRET required");
/// jwt::initialize_jwt_secret(&secret).expect("Failed to initialize JWT secret");
/// ```
use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

pub const ACCESS_TOKEN_EXPIRY_SECS: i64 = 3600;

/// JWT algorithm - symmetric, the secret never leaves the backend
const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

const ACCESS_TOKEN_TYPE: &str = "access";

// ============================================================================
// Data Structures
// ============================================================================

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Numeric user id
    pub user_id: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type, always "access" for tokens issued here
    pub token_type: String,
}

struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

// ============================================================================
// Key Storage
// ============================================================================

/// Keys are initialized once at startup and never modified.
static JWT_KEYS: OnceCell<JwtKeys> = OnceCell::new();

// ============================================================================
// Initialization
// ============================================================================

/// Initialize the signing secret
///
/// Can only be called once - subsequent calls return an error.
///
/// ## Errors
///
/// - Secret is empty
/// - Keys are already initialized
pub fn initialize_jwt_secret(secret: &str) -> Result<()> {
    if secret.is_empty() {
        return Err(anyhow!("JWT secret must not be empty"));
    }

    JWT_KEYS
        .set(JwtKeys {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        })
        .map_err(|_| anyhow!("JWT secret already initialized"))
}

/// Returns true once `initialize_jwt_secret` has succeeded
pub fn is_initialized() -> bool {
    JWT_KEYS.get().is_some()
}

fn keys() -> Result<&'static JwtKeys> {
    JWT_KEYS.get().ok_or_else(|| {
        anyhow!("JWT secret not initialized. Call initialize_jwt_secret() during startup.")
    })
}

// ============================================================================
// Token Generation
// ============================================================================

/// Generate a new access token valid for one hour
pub fn generate_access_token(user_id: i64) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        user_id,
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ACCESS_TOKEN_EXPIRY_SECS)).timestamp(),
        token_type: ACCESS_TOKEN_TYPE.to_string(),
    };

    encode_claims(&claims)
}

/// Sign arbitrary claims with the shared secret
pub fn encode_claims(claims: &Claims) -> Result<String> {
    encode(&Header::new(JWT_ALGORITHM), claims, &keys()?.encoding)
        .map_err(|e| anyhow!("Failed to generate access token: {e}"))
}

// ============================================================================
// Token Validation
// ============================================================================

/// Validate and decode a JWT token
///
/// Checks the HS256 signature, expiration and token type.
///
/// ## Arguments
///
/// * `token` - JWT token string (without "Bearer " prefix)
pub fn validate_token(token: &str) -> Result<TokenData<Claims>> {
    let mut validation = Validation::new(JWT_ALGORITHM);
    validation.validate_exp = true;
    validation.leeway = 0;

    let data = decode::<Claims>(token, &keys()?.decoding, &validation)
        .map_err(|e| anyhow!("Token validation failed: {e}"))?;

    if data.claims.token_type != ACCESS_TOKEN_TYPE {
        return Err(anyhow!("Token validation failed: unexpected token type"));
    }

    Ok(data)
}

/// Extract user ID from a validated token
pub fn get_user_id_from_token(token: &str) -> Result<i64> {
    Ok(validate_token(token)?.claims.user_id)
}

// ============================================================================
// Tests
// ============================================================================
