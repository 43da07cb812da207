pub mod claims;
pub mod errors;
pub mod handler;

pub use claims::AccessClaims;
pub use claims::RefreshClaims;
pub use claims::TimedClaims;
pub use claims::TokenType;
pub use errors::JwtError;
pub use handler::JwtHandler;
pub use handler::DEFAULT_LEEWAY_SECONDS;
pub use handler::MAX_LEEWAY_SECONDS;
