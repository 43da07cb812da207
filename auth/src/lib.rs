//! Authentication utilities library
//!
//! Provides reusable authentication infrastructure for microservices:
//! - Password hashing (Argon2id, tunable work factor)
//! - JWT encoding and validation (HS256 only, clock-skew leeway)
//! - Access/refresh token generation with separate secrets
//! - Refresh token digests for storage
//!
//! Each service defines its own authentication traits and adapts these implementations.
//! This avoids coupling services through shared domain logic while reducing code duplication.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("other_password", &hash));
//! ```
//!
//! ## Access and Refresh Tokens
//! ```
//! use auth::{TokenGenerator, TokenSettings};
//! use chrono::Duration;
//!
//! let tokens = TokenGenerator::new(TokenSettings {
//!     access_secret: b"access_secret_at_least_32_bytes_long!".to_vec(),
//!     refresh_secret: b"refresh_secret_at_least_32_bytes_long".to_vec(),
//!     access_ttl: Duration::minutes(15),
//!     refresh_ttl: Duration::hours(720),
//!     leeway_seconds: 30,
//! })
//! .unwrap();
//!
//! let refresh = tokens.generate_refresh_token("account-1", "session-1").unwrap();
//! let claims = tokens.validate_refresh_token(&refresh).unwrap();
//! assert_eq!(claims.jti, "session-1");
//!
//! // A refresh token is never accepted as an access token
//! assert!(tokens.validate_access_token(&refresh).is_err());
//!
//! // Only the digest is stored
//! let stored = auth::token_digest(&refresh);
//! assert_eq!(stored.len(), 64);
//! ```

pub mod digest;
pub mod jwt;
pub mod password;
pub mod tokens;

// Re-export commonly used items
pub use digest::token_digest;
pub use jwt::AccessClaims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::RefreshClaims;
pub use jwt::TokenType;
pub use password::Argon2Params;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use tokens::TokenError;
pub use tokens::TokenGenerator;
pub use tokens::TokenSettings;
