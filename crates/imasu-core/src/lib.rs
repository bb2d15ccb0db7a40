//! # imasu-core
//!
//! Core crate for Imasu, the club-room presence tracker. Contains the
//! configuration schema, typed identifiers, the credential-resolution
//! capability, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Imasu crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
