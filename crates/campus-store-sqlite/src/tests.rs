//! Integration tests for `SqliteStore` against an in-memory database.

use campus_core::{
  Resolution, ResolvedIdentity, Role, RoleRecordReader, SessionSource,
  SubjectId, store::IdentityStore, to_canonical,
};
use chrono::{Duration, Utc};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

/// A subject with `role` and a live session under `token`.
async fn enrol(s: &SqliteStore, handle: &str, role: Role, token: &str) -> SubjectId {
  let subject = s.add_subject(to_canonical(handle)).await.unwrap();
  s.assign_role(subject.subject_id, role).await.unwrap();
  s.record_session(token, subject.subject_id, Utc::now() + Duration::hours(1))
    .await
    .unwrap();
  subject.subject_id
}

// ─── Subjects ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_subject() {
  let s = store().await;

  let subject = s.add_subject(to_canonical("Principal")).await.unwrap();
  assert_eq!(subject.canonical_id.as_str(), "principal@school.local");

  let fetched = s.get_subject(subject.subject_id).await.unwrap().unwrap();
  assert_eq!(fetched.subject_id, subject.subject_id);
  assert_eq!(fetched.canonical_id, subject.canonical_id);
  assert_eq!(fetched.canonical_id.handle(), "principal");
}

#[tokio::test]
async fn get_subject_missing_returns_none() {
  let s = store().await;
  assert!(s.get_subject(SubjectId::new()).await.unwrap().is_none());
}

#[tokio::test]
async fn find_subject_by_canonical_id() {
  let s = store().await;
  let subject = s.add_subject(to_canonical("bursar")).await.unwrap();

  let found = s.find_subject(&to_canonical(" BURSAR ")).await.unwrap().unwrap();
  assert_eq!(found.subject_id, subject.subject_id);

  assert!(s.find_subject(&to_canonical("nobody")).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_canonical_id_is_rejected() {
  let s = store().await;
  s.add_subject(to_canonical("teacher1")).await.unwrap();

  let err = s.add_subject(to_canonical("Teacher1")).await.unwrap_err();
  assert!(matches!(err, Error::SubjectExists(id) if id.as_str() == "teacher1@school.local"));
}

// ─── Role records ────────────────────────────────────────────────────────────

#[tokio::test]
async fn assign_role_upserts_single_record() {
  let s = store().await;
  let subject = s.add_subject(to_canonical("mentor")).await.unwrap();
  let reader = s.privileged_reader();

  s.assign_role(subject.subject_id, Role::Teacher).await.unwrap();
  s.assign_role(subject.subject_id, Role::ClassSupervisor).await.unwrap();

  let record = reader.read_role_record(subject.subject_id).await.unwrap().unwrap();
  assert_eq!(record.subject_id, subject.subject_id);
  assert_eq!(record.role, Role::ClassSupervisor);
}

#[tokio::test]
async fn assign_role_to_unknown_subject_fails() {
  let s = store().await;
  let ghost = SubjectId::new();

  let err = s.assign_role(ghost, Role::Admin).await.unwrap_err();
  assert!(matches!(err, Error::SubjectNotFound(id) if id == ghost));
  assert!(s.privileged_reader().read_role_record(ghost).await.unwrap().is_none());
}

#[tokio::test]
async fn every_role_survives_storage() {
  let s = store().await;
  let reader = s.privileged_reader();

  for (i, role) in Role::ALL.into_iter().enumerate() {
    let subject = s.add_subject(to_canonical(&format!("user{i}"))).await.unwrap();
    s.assign_role(subject.subject_id, role).await.unwrap();
    let record = reader.read_role_record(subject.subject_id).await.unwrap().unwrap();
    assert_eq!(record.role, role);
  }
}

// ─── Sessions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_cookie_is_anonymous() {
  let s = store().await;
  assert!(s.session(None).authenticated_subject().await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_token_is_anonymous() {
  let s = store().await;
  enrol(&s, "clerk", Role::Accountant, "real-token").await;

  let lookup = s.session(Some("forged-token"));
  assert!(lookup.authenticated_subject().await.unwrap().is_none());
}

#[tokio::test]
async fn live_token_yields_subject() {
  let s = store().await;
  let id = enrol(&s, "clerk", Role::Accountant, "real-token").await;

  let lookup = s.session(Some("real-token"));
  assert_eq!(lookup.authenticated_subject().await.unwrap(), Some(id));
}

#[tokio::test]
async fn expired_token_is_anonymous() {
  let s = store().await;
  let subject = s.add_subject(to_canonical("former")).await.unwrap();
  s.record_session("old", subject.subject_id, Utc::now() - Duration::minutes(1))
    .await
    .unwrap();

  assert!(s.session(Some("old")).authenticated_subject().await.unwrap().is_none());
}

#[tokio::test]
async fn revoked_token_is_anonymous() {
  let s = store().await;
  enrol(&s, "visitor", Role::Parent, "tok").await;

  assert!(s.revoke_session("tok").await.unwrap());
  assert!(!s.revoke_session("tok").await.unwrap());
  assert!(s.session(Some("tok")).authenticated_subject().await.unwrap().is_none());
}

// ─── End-to-end resolution ───────────────────────────────────────────────────

#[tokio::test]
async fn resolver_over_sqlite() {
  let s = store().await;
  let admin = enrol(&s, "head", Role::Admin, "admin-token").await;
  let teacher = enrol(&s, "maths", Role::Teacher, "teacher-token").await;
  let resolver = s.role_resolver();

  let resolution = resolver.resolve_current_role(&s.session(Some("admin-token"))).await;
  assert_eq!(
    resolution,
    Resolution::Resolved(ResolvedIdentity { subject_id: admin, role: Role::Admin })
  );
  assert!(resolution.is_elevated());

  let resolution = resolver.resolve_current_role(&s.session(Some("teacher-token"))).await;
  assert_eq!(resolution.identity().map(|i| i.subject_id), Some(teacher));
  assert!(!resolution.is_elevated());

  let resolution = resolver.resolve_current_role(&s.session(None)).await;
  assert_eq!(resolution, Resolution::Unresolved);
}

#[tokio::test]
async fn session_without_role_record_is_unresolved() {
  let s = store().await;
  let subject = s.add_subject(to_canonical("newcomer")).await.unwrap();
  s.record_session("fresh", subject.subject_id, Utc::now() + Duration::hours(1))
    .await
    .unwrap();
  let resolver = s.role_resolver();

  let resolution = resolver.resolve_current_role(&s.session(Some("fresh"))).await;
  assert_eq!(resolution, Resolution::Unresolved);
}
