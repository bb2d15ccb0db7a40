//! HTTP request handlers, one module per resource.

pub mod account;
pub mod attendance;
pub mod health;
pub mod member;
