//! Authentication primitives library
//!
//! Provides the cryptographic building blocks for session management:
//! - Password hashing (Argon2id, salted, self-describing digests)
//! - Signed session tokens with independent access/refresh secrets
//! - Token-pair issuance under a fixed lifetime policy
//!
//! Services compose these primitives behind their own ports; the library
//! itself performs no I/O and holds no state beyond the signing keys.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let digest = hasher.hash("hunter2").unwrap();
//! assert!(hasher.verify("hunter2", &digest).unwrap());
//! assert!(!hasher.verify("wrong", &digest).unwrap());
//! ```
//!
//! ## Session Tokens
//! ```
//! use std::time::Duration;
//!
//! use auth::TokenCodec;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!", Duration::from_secs(60));
//! let token = codec.issue("user-123").unwrap();
//! let claims = codec.verify(&token).unwrap();
//! assert_eq!(claims.sub, "user-123");
//! ```
//!
//! ## Token Pairs
//! ```
//! use auth::TokenPairIssuer;
//!
//! let issuer = TokenPairIssuer::new(
//!     b"access_secret_at_least_32_bytes!!",
//!     b"refresh_secret_at_least_32_bytes!",
//! );
//! let pair = issuer.issue_pair("user-123").unwrap();
//! let claims = issuer.verify_access(&pair.access_token).unwrap();
//! assert_eq!(claims.sub, "user-123");
//! ```

pub mod password;
pub mod token;

// Re-export commonly used items
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::SessionClaims;
pub use token::TokenCodec;
pub use token::TokenError;
pub use token::TokenPair;
pub use token::TokenPairIssuer;
pub use token::ACCESS_TOKEN_TTL;
pub use token::REFRESH_TOKEN_TTL;
