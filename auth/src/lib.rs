//! Authentication utilities library
//!
//! Provides reusable authentication infrastructure for services:
//! - Password hashing (Argon2id)
//! - ES256 JWT signing and verification with an EC P-256 key pair
//! - Access/refresh token pair issuance
//!
//! Services define their own authentication ports and adapt these implementations.
//! Verification only ever needs the public key; the private key stays with the issuer.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Token Pairs
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use auth::{EcKeyPair, JwtHandler, TokenIssuer};
//!
//! let keys = EcKeyPair::from_files("certs/private.pem", "certs/public.pem")?;
//! let handler = JwtHandler::new(keys, "account-service");
//! let issuer = TokenIssuer::new(
//!     handler,
//!     chrono::Duration::minutes(15),
//!     chrono::Duration::days(7),
//! );
//!
//! let tokens = issuer.issue_pair("0190c2d4-...", "alice@example.com", "user")?;
//! let claims = issuer.verify(&tokens.access_token)?;
//! assert_eq!(claims.email, "alice@example.com");
//! # Ok(())
//! # }
//! ```

pub mod issuer;
pub mod jwt;
pub mod keys;
pub mod password;

// Re-export commonly used items
pub use issuer::IssuedTokens;
pub use issuer::TokenIssuer;
pub use jwt::Claims;
pub use jwt::TokenType;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use keys::EcKeyPair;
pub use keys::KeyError;
pub use password::PasswordError;
pub use password::PasswordHasher;
