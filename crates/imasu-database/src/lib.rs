//! # imasu-database
//!
//! Persistence for Imasu. The [`PresenceStore`] trait is the single seam
//! the service layer talks to; it is implemented by the PostgreSQL
//! repositories and by a process-local in-memory store.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryPresenceStore;
pub use repositories::PgPresenceStore;
pub use store::{PresenceStore, open_store};
