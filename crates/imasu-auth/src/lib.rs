//! # imasu-auth
//!
//! Credential handling for Imasu.
//!
//! ## Modules
//!
//! - `jwt`: access token issuance and verification
//! - `password`: Argon2id hashing and length policy
//! - `gate`: the [`CredentialResolver`](imasu_core::traits::CredentialResolver)
//!   used by the HTTP layer

pub mod gate;
pub mod jwt;
pub mod password;

pub use gate::JwtGate;
pub use jwt::{Claims, IssuedToken, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordValidator};
