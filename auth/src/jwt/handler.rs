use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::claims::TimedClaims;
use super::claims::TokenType;
use super::errors::JwtError;

/// Clock skew tolerated on `exp` and `iat`, in seconds.
pub const DEFAULT_LEEWAY_SECONDS: u64 = 30;

/// Upper bound applied by [`JwtHandler::with_leeway`].
pub const MAX_LEEWAY_SECONDS: u64 = 300;

/// JWT token handler for encoding and decoding tokens.
///
/// Generic over the claims type. Signs with HS256 (HMAC with SHA-256) and only
/// ever accepts HS256 on decode, so `none` and algorithm-substitution tokens
/// are rejected before any claim is read.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    leeway_seconds: u64,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256 algorithm
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
            leeway_seconds: DEFAULT_LEEWAY_SECONDS,
        }
    }

    /// Override the clock skew tolerance, capped at [`MAX_LEEWAY_SECONDS`].
    pub fn with_leeway(mut self, leeway_seconds: u64) -> Self {
        self.leeway_seconds = leeway_seconds.min(MAX_LEEWAY_SECONDS);
        self
    }

    /// Encode claims into a JWT token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and fully validate a JWT token.
    ///
    /// Checks signature, algorithm allow-list, `exp` and `iat` against the
    /// leeway, presence of `sub`/`exp`/`iat`, and the `type` claim.
    ///
    /// # Arguments
    /// * `token` - JWT token string to decode
    /// * `expected` - Token kind the caller is willing to accept
    ///
    /// # Errors
    /// * `TokenExpired` - `exp` is further in the past than the leeway
    /// * `IssuedInFuture` - `iat` is further in the future than the leeway
    /// * `InvalidSignature` - Signed with another key
    /// * `AlgorithmNotAllowed` - Header algorithm is not HS256
    /// * `MissingClaim` - A required registered claim is absent
    /// * `WrongTokenType` - `type` claim differs from `expected`
    /// * `DecodingFailed` - Malformed token or claims
    pub fn decode<T>(&self, token: &str, expected: TokenType) -> Result<T, JwtError>
    where
        T: DeserializeOwned + TimedClaims,
    {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = self.leeway_seconds;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        let token_data = decode::<T>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                    JwtError::AlgorithmNotAllowed
                }
                ErrorKind::MissingRequiredClaim(claim) => JwtError::MissingClaim(claim.clone()),
                _ => JwtError::DecodingFailed(e.to_string()),
            }
        })?;

        let claims = token_data.claims;

        let leeway = i64::try_from(self.leeway_seconds).unwrap_or(i64::MAX);
        let latest_issue = Utc::now().timestamp().saturating_add(leeway);
        if claims.issued_at() > latest_issue {
            return Err(JwtError::IssuedInFuture);
        }

        if claims.token_type() != expected {
            return Err(JwtError::WrongTokenType);
        }

        Ok(claims)
    }
}
