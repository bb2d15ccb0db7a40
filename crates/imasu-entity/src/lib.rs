//! # imasu-entity
//!
//! Domain entity models for Imasu. Every struct in this crate represents a
//! database table row or a domain value object. Database entities derive
//! `sqlx::FromRow`.
//!
//! The presence transition table lives here as a pure function so that
//! every layer (store, service, tests) shares one definition of legality.

pub mod attendance;
pub mod member;
pub mod presence;
