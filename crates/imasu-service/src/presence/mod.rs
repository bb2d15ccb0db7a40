//! Presence transitions and attendance history.

pub mod service;

pub use service::{ApplyAction, PresenceService};
