//! Core types and trait definitions for Campus identity & role resolution.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backend (`campus-store-sqlite`) implements the collaborator traits
//! defined here; the server (`campus-server`) wires them into requests.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod error;
pub mod handle;
pub mod resolve;
pub mod role;
pub mod store;
pub mod subject;

pub use error::{Error, Result};
pub use handle::{
  CANONICAL_SUFFIX, CanonicalId, Handle, from_canonical, is_valid_handle,
  to_canonical,
};
pub use resolve::{
  Resolution, ResolvedIdentity, RoleRecordReader, RoleResolver, SessionSource,
};
pub use role::{Role, RoleRecord, is_elevated};
pub use subject::{Subject, SubjectId};
