use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use sha2::{Digest, Sha256};

/// Compute SHA256 hash of input bytes
pub fn sha256(input: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(input);
    hasher.finalize().into()
}

/// Hash an opaque token for storage.
///
/// Refresh tokens are persisted only as the padded base64url form of their
/// SHA256 digest, so a leaked table cannot be replayed.
pub fn hash_token(token: &str) -> String {
    URL_SAFE.encode(sha256(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let input = b"hello world";
        let hash = sha256(input);
        assert_eq!(hash.len(), 32);

        // Verify deterministic
        let hash2 = sha256(input);
        assert_eq!(hash, hash2);
        assert_eq!(
            hex::encode(hash),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_hash_token_is_stable_and_url_safe() {
        let a = hash_token("refresh-token");
        let b = hash_token("refresh-token");
        assert_eq!(a, b);
        assert_ne!(a, hash_token("other-token"));
        assert!(!a.contains('+') && !a.contains('/'));
        // 32 bytes -> 44 padded base64 characters
        assert_eq!(a.len(), 44);
    }
}
