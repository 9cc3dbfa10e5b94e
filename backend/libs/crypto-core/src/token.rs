use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use rand::{rngs::OsRng, RngCore};

const TOKEN_BYTES: usize = 32;

fn random_bytes() -> [u8; TOKEN_BYTES] {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Opaque refresh token: 32 random bytes, padded base64url.
pub fn generate_refresh_token() -> String {
    URL_SAFE.encode(random_bytes())
}

/// Hex token used in password-reset and email-verification links.
pub fn generate_hex_token() -> String {
    hex::encode(random_bytes())
}
