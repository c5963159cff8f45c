//! SQLite backend for the Campus identity store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. The store hands out the two role
//! resolution collaborators: an unprivileged [`SessionLookup`] per request and
//! a single [`PrivilegedRoleReader`] per process.

mod encode;
mod schema;
mod session;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use session::{PrivilegedRoleReader, SessionLookup};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
