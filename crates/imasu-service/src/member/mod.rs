//! Member self-service profile operations.

pub mod service;

pub use service::{MemberService, UpdateProfile};
