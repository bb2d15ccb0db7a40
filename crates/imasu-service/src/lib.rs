//! # imasu-service
//!
//! Application services for Imasu. Each service receives its dependencies
//! at construction time as `Arc`s and takes the acting member from a
//! [`RequestContext`] built by the HTTP layer after the credential gate.

pub mod account;
pub mod context;
pub mod member;
pub mod presence;
pub mod roster;

pub use account::{AccountService, RegisterAccount};
pub use context::RequestContext;
pub use member::{MemberService, UpdateProfile};
pub use presence::{ApplyAction, PresenceService};
pub use roster::{RosterEntry, RosterService};
