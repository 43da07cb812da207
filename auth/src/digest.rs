use sha2::Digest;
use sha2::Sha256;

/// Hex-encoded SHA-256 digest of a token string.
///
/// Refresh tokens are persisted only in this form; the plaintext never
/// reaches storage.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
