//! The `IdentityStore` trait — the administrative side of the identity store.
//!
//! Subjects and role records are written out-of-band (account provisioning,
//! role assignment). The role resolver never goes through this trait; it only
//! sees the narrower collaborator traits in [`crate::resolve`].

use std::future::Future;

use crate::{
  handle::CanonicalId,
  role::{Role, RoleRecord},
  subject::{Subject, SubjectId},
};

/// Abstraction over an identity store backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait IdentityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create a subject for `canonical_id` with a freshly assigned id.
  /// Returns an error if the canonical id is already taken.
  fn add_subject(
    &self,
    canonical_id: CanonicalId,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;

  /// Retrieve a subject by id. Returns `None` if not found.
  fn get_subject(
    &self,
    id: SubjectId,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + '_;

  /// Retrieve a subject by canonical id. Returns `None` if not found.
  fn find_subject<'a>(
    &'a self,
    canonical_id: &'a CanonicalId,
  ) -> impl Future<Output = Result<Option<Subject>, Self::Error>> + Send + 'a;

  /// Create or replace the role record for `subject_id`.
  ///
  /// Returns an error if the subject does not exist; a role record never
  /// outlives its subject.
  fn assign_role(
    &self,
    subject_id: SubjectId,
    role: Role,
  ) -> impl Future<Output = Result<RoleRecord, Self::Error>> + Send + '_;
}
