pub mod account;
pub mod auth;
pub mod errors;
pub mod session;
