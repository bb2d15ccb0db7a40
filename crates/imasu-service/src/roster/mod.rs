//! Who is in the room right now.

pub mod service;

pub use service::{RosterEntry, RosterService};
