//! Core traits defined in `imasu-core` and implemented by other crates.

pub mod credential;

pub use credential::CredentialResolver;
