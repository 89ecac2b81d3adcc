pub mod password_hasher;
pub mod token_provider;

pub use password_hasher::Argon2PasswordHasher;
pub use token_provider::JwtTokenProvider;
