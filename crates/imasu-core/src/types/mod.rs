//! Core type definitions used across the Imasu workspace.

pub mod id;

pub use id::MemberId;
