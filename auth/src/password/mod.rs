pub mod argon2;
pub mod errors;

pub use self::argon2::Argon2Params;
pub use self::argon2::PasswordHasher;
pub use self::argon2::DEFAULT_MAX_PASSWORD_LENGTH;
pub use errors::PasswordError;
