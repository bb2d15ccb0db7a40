//! Account registration and password login.

pub mod service;

pub use service::{AccountService, RegisterAccount};
