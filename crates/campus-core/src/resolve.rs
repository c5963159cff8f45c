//! Role Resolver — who is calling, and what role do they hold?
//!
//! Resolution runs in two strictly ordered phases:
//!
//! 1. **Session** (unprivileged): ask the request's [`SessionSource`] for the
//!    authenticated subject. No subject means no second phase.
//! 2. **Role lookup** (privileged): ask the process-wide [`RoleRecordReader`]
//!    for the record keyed by the phase-1 subject id, and by nothing else.
//!
//! Every failure collapses to [`Resolution::Unresolved`]. The resolver never
//! returns an error to its caller; it logs the reason and denies.

use std::{fmt, future::Future, sync::Arc};

use serde::Serialize;

use crate::{
  role::{Role, RoleRecord},
  subject::SubjectId,
};

// ─── Collaborators ───────────────────────────────────────────────────────────

/// Request-scoped view of the caller's session.
///
/// Implementations reflect credential validation already performed upstream
/// (cookie / session token). The resolver treats the answer as ground truth.
pub trait SessionSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// The currently authenticated subject, or `None` for anonymous callers.
  fn authenticated_subject(
    &self,
  ) -> impl Future<Output = Result<Option<SubjectId>, Self::Error>> + Send + '_;
}

/// Privileged read access to role records.
///
/// Bypasses record-level access policy, so it must only ever be keyed by a
/// subject id obtained from a [`SessionSource`]. [`RoleResolver`] is the only
/// caller that should hold one.
pub trait RoleRecordReader: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn read_role_record(
    &self,
    subject_id: SubjectId,
  ) -> impl Future<Output = Result<Option<RoleRecord>, Self::Error>> + Send + '_;
}

// ─── Result ──────────────────────────────────────────────────────────────────

/// A caller whose role has been established.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedIdentity {
  pub subject_id: SubjectId,
  pub role:       Role,
}

impl ResolvedIdentity {
  pub fn is_elevated(&self) -> bool { self.role.is_elevated() }
}

/// The answer to "who is calling and with what role?".
///
/// There is no error case: `Unresolved` covers anonymous callers, missing
/// records and store failures alike, and always means "no access".
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
  Resolved(ResolvedIdentity),
  Unresolved,
}

impl Resolution {
  pub fn identity(&self) -> Option<&ResolvedIdentity> {
    match self {
      Self::Resolved(identity) => Some(identity),
      Self::Unresolved => None,
    }
  }

  pub fn is_resolved(&self) -> bool { matches!(self, Self::Resolved(_)) }

  /// `false` for `Unresolved`.
  pub fn is_elevated(&self) -> bool {
    self.identity().is_some_and(ResolvedIdentity::is_elevated)
  }
}

// ─── Internal outcome ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
  Session,
  RoleLookup,
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Session => "session",
      Self::RoleLookup => "role_lookup",
    })
  }
}

/// Why a resolution ended the way it did. Kept for logging only; callers see
/// a [`Resolution`].
#[derive(Debug)]
enum Outcome {
  Resolved(ResolvedIdentity),
  Unauthenticated,
  NoRoleRecord(SubjectId),
  Mismatched { session: SubjectId, record: SubjectId },
  Unavailable { phase: Phase, error: String },
}

impl Outcome {
  fn log(&self) {
    match self {
      Self::Resolved(identity) => tracing::debug!(
        subject_id = %identity.subject_id,
        role = %identity.role,
        "role resolved"
      ),
      Self::Unauthenticated => tracing::debug!("no authenticated session"),
      Self::NoRoleRecord(subject_id) => tracing::warn!(
        subject_id = %subject_id,
        "authenticated subject has no role record"
      ),
      Self::Mismatched { session, record } => tracing::warn!(
        subject_id = %session,
        record_subject_id = %record,
        "role record does not belong to the session subject"
      ),
      Self::Unavailable { phase, error } => tracing::error!(
        phase = %phase,
        error = %error,
        "identity store unavailable during role resolution"
      ),
    }
  }
}

impl From<Outcome> for Resolution {
  fn from(outcome: Outcome) -> Self {
    match outcome {
      Outcome::Resolved(identity) => Resolution::Resolved(identity),
      Outcome::Unauthenticated
      | Outcome::NoRoleRecord(_)
      | Outcome::Mismatched { .. }
      | Outcome::Unavailable { .. } => Resolution::Unresolved,
    }
  }
}

// ─── Resolver ────────────────────────────────────────────────────────────────

/// Resolves the caller's identity and role.
///
/// Construct once at process start with the privileged reader and share it;
/// cloning is cheap. Holds no per-request state and no cache.
pub struct RoleResolver<R> {
  reader: Arc<R>,
}

impl<R> Clone for RoleResolver<R> {
  fn clone(&self) -> Self { Self { reader: Arc::clone(&self.reader) } }
}

impl<R: RoleRecordReader> RoleResolver<R> {
  pub fn new(reader: Arc<R>) -> Self { Self { reader } }

  /// The sole authorization entry point. Never fails: anything short of a
  /// matching role record for the session's own subject is `Unresolved`.
  pub async fn resolve_current_role<S>(&self, session: &S) -> Resolution
  where
    S: SessionSource,
  {
    let outcome = self.resolve(session).await;
    outcome.log();
    outcome.into()
  }

  async fn resolve<S>(&self, session: &S) -> Outcome
  where
    S: SessionSource,
  {
    let subject_id = match session.authenticated_subject().await {
      Ok(Some(id)) => id,
      Ok(None) => return Outcome::Unauthenticated,
      Err(e) => {
        return Outcome::Unavailable {
          phase: Phase::Session,
          error: e.to_string(),
        };
      }
    };

    match self.reader.read_role_record(subject_id).await {
      Ok(Some(record)) if record.subject_id == subject_id => {
        Outcome::Resolved(ResolvedIdentity { subject_id, role: record.role })
      }
      Ok(Some(record)) => Outcome::Mismatched {
        session: subject_id,
        record:  record.subject_id,
      },
      Ok(None) => Outcome::NoRoleRecord(subject_id),
      Err(e) => Outcome::Unavailable {
        phase: Phase::RoleLookup,
        error: e.to_string(),
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{
    collections::HashMap,
    sync::{
      Mutex,
      atomic::{AtomicUsize, Ordering},
    },
  };

  use super::*;

  #[derive(Debug, thiserror::Error)]
  #[error("store unreachable")]
  struct Unreachable;

  /// Session double: reports a fixed answer and counts calls.
  struct FakeSession {
    answer: Result<Option<SubjectId>, ()>,
    calls:  AtomicUsize,
  }

  impl FakeSession {
    fn anonymous() -> Self { Self { answer: Ok(None), calls: AtomicUsize::new(0) } }

    fn of(id: SubjectId) -> Self {
      Self { answer: Ok(Some(id)), calls: AtomicUsize::new(0) }
    }

    fn failing() -> Self { Self { answer: Err(()), calls: AtomicUsize::new(0) } }
  }

  impl SessionSource for FakeSession {
    type Error = Unreachable;

    async fn authenticated_subject(&self) -> Result<Option<SubjectId>, Unreachable> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      self.answer.map_err(|()| Unreachable)
    }
  }

  /// Privileged-reader double: records every key it is asked for.
  #[derive(Default)]
  struct FakeReader {
    records: HashMap<SubjectId, RoleRecord>,
    fail:    bool,
    keys:    Mutex<Vec<SubjectId>>,
  }

  impl FakeReader {
    fn with(records: impl IntoIterator<Item = (SubjectId, Role)>) -> Self {
      Self {
        records: records
          .into_iter()
          .map(|(subject_id, role)| (subject_id, RoleRecord { subject_id, role }))
          .collect(),
        ..Self::default()
      }
    }

    fn failing() -> Self { Self { fail: true, ..Self::default() } }

    fn keys(&self) -> Vec<SubjectId> { self.keys.lock().unwrap().clone() }
  }

  impl RoleRecordReader for FakeReader {
    type Error = Unreachable;

    async fn read_role_record(
      &self,
      subject_id: SubjectId,
    ) -> Result<Option<RoleRecord>, Unreachable> {
      self.keys.lock().unwrap().push(subject_id);
      if self.fail {
        return Err(Unreachable);
      }
      Ok(self.records.get(&subject_id).copied())
    }
  }

  /// Reader that answers every lookup with a record for someone else.
  struct ForeignRecordReader(SubjectId);

  impl RoleRecordReader for ForeignRecordReader {
    type Error = Unreachable;

    async fn read_role_record(
      &self,
      _: SubjectId,
    ) -> Result<Option<RoleRecord>, Unreachable> {
      Ok(Some(RoleRecord { subject_id: self.0, role: Role::Owner }))
    }
  }

  fn resolver<R: RoleRecordReader>(reader: R) -> (RoleResolver<R>, Arc<R>) {
    let reader = Arc::new(reader);
    (RoleResolver::new(Arc::clone(&reader)), reader)
  }

  #[tokio::test]
  async fn anonymous_caller_never_reaches_privileged_reader() {
    let (resolver, reader) = resolver(FakeReader::with([(SubjectId::new(), Role::Admin)]));
    let session = FakeSession::anonymous();

    assert_eq!(resolver.resolve_current_role(&session).await, Resolution::Unresolved);
    assert_eq!(session.calls.load(Ordering::SeqCst), 1);
    assert!(reader.keys().is_empty());
  }

  #[tokio::test]
  async fn session_failure_is_unresolved_without_lookup() {
    let (resolver, reader) = resolver(FakeReader::default());

    let resolution = resolver.resolve_current_role(&FakeSession::failing()).await;
    assert_eq!(resolution, Resolution::Unresolved);
    assert!(reader.keys().is_empty());
  }

  #[tokio::test]
  async fn missing_role_record_is_unresolved() {
    let subject = SubjectId::new();
    let (resolver, reader) = resolver(FakeReader::default());

    let resolution = resolver.resolve_current_role(&FakeSession::of(subject)).await;
    assert_eq!(resolution, Resolution::Unresolved);
    assert_eq!(reader.keys(), vec![subject]);
  }

  #[tokio::test]
  async fn reader_failure_is_unresolved() {
    let (resolver, _) = resolver(FakeReader::failing());

    let resolution = resolver
      .resolve_current_role(&FakeSession::of(SubjectId::new()))
      .await;
    assert_eq!(resolution, Resolution::Unresolved);
    assert!(!resolution.is_elevated());
  }

  #[tokio::test]
  async fn admin_on_record_resolves() {
    let subject = SubjectId::new();
    let (resolver, _) = resolver(FakeReader::with([(subject, Role::Admin)]));

    let resolution = resolver.resolve_current_role(&FakeSession::of(subject)).await;
    assert_eq!(
      resolution,
      Resolution::Resolved(ResolvedIdentity { subject_id: subject, role: Role::Admin })
    );
    assert!(resolution.is_elevated());
  }

  #[tokio::test]
  async fn teacher_resolves_without_elevation() {
    let subject = SubjectId::new();
    let (resolver, _) = resolver(FakeReader::with([(subject, Role::Teacher)]));

    let resolution = resolver.resolve_current_role(&FakeSession::of(subject)).await;
    let identity = resolution.identity().copied().unwrap();
    assert_eq!(identity.role, Role::Teacher);
    assert!(!identity.is_elevated());
  }

  #[tokio::test]
  async fn lookup_is_keyed_by_session_subject() {
    // The reader knows two subjects; the session says the caller is `mine`.
    let mine = SubjectId::new();
    let other = SubjectId::new();
    let (resolver, reader) =
      resolver(FakeReader::with([(mine, Role::Student), (other, Role::Owner)]));

    let resolution = resolver.resolve_current_role(&FakeSession::of(mine)).await;
    assert_eq!(reader.keys(), vec![mine]);
    assert_eq!(resolution.identity().map(|i| i.subject_id), Some(mine));
    assert_eq!(resolution.identity().map(|i| i.role), Some(Role::Student));
  }

  #[tokio::test]
  async fn record_for_another_subject_is_rejected() {
    let (resolver, _) = resolver(ForeignRecordReader(SubjectId::new()));

    let resolution = resolver
      .resolve_current_role(&FakeSession::of(SubjectId::new()))
      .await;
    assert_eq!(resolution, Resolution::Unresolved);
  }

  #[tokio::test]
  async fn concurrent_resolutions_are_independent() {
    let (a, b) = (SubjectId::new(), SubjectId::new());
    let (resolver, _) = resolver(FakeReader::with([(a, Role::Parent), (b, Role::Owner)]));
    let (session_a, session_b) = (FakeSession::of(a), FakeSession::of(b));
    let anonymous = FakeSession::anonymous();

    let (ra, rb, rc) = tokio::join!(
      resolver.resolve_current_role(&session_a),
      resolver.resolve_current_role(&session_b),
      resolver.resolve_current_role(&anonymous),
    );
    assert_eq!(ra.identity().map(|i| i.role), Some(Role::Parent));
    assert_eq!(rb.identity().map(|i| i.role), Some(Role::Owner));
    assert_eq!(rc, Resolution::Unresolved);
  }
}
