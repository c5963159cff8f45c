//! [`SqliteStore`] — the SQLite implementation of [`IdentityStore`].

use std::{path::Path, sync::Arc};

use campus_core::{
  CanonicalId, Role, RoleRecord, RoleResolver, Subject, SubjectId,
  store::IdentityStore,
};
use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{RawSubject, encode_dt, encode_subject_id, hash_token},
  schema::SCHEMA,
  session::{PrivilegedRoleReader, SessionLookup},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An identity store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Collaborators ─────────────────────────────────────────────────────────

  /// The unprivileged session view for one request's cookie token.
  pub fn session(&self, token: Option<&str>) -> SessionLookup {
    SessionLookup::new(self.conn.clone(), token.map(hash_token))
  }

  /// The role resolver for this store. Build once at startup and share it.
  ///
  /// This is the only way out of the crate for the privileged reader; it
  /// cannot be obtained on its own.
  ///
  /// ```rust,compile_fail
  /// fn read_any(store: &campus_store_sqlite::SqliteStore) {
  ///   let _reader = store.privileged_reader();
  /// }
  /// ```
  pub fn role_resolver(&self) -> RoleResolver<PrivilegedRoleReader> {
    RoleResolver::new(Arc::new(self.privileged_reader()))
  }

  pub(crate) fn privileged_reader(&self) -> PrivilegedRoleReader {
    PrivilegedRoleReader::new(self.conn.clone())
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  /// Persist a session issued by the login flow. Only the token's hash is
  /// stored.
  pub async fn record_session(
    &self,
    token:      &str,
    subject_id: SubjectId,
    expires_at: DateTime<Utc>,
  ) -> Result<()> {
    let hash_str    = hash_token(token);
    let subject_str = encode_subject_id(subject_id);
    let issued_str  = encode_dt(Utc::now());
    let expires_str = encode_dt(expires_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, subject_id, issued_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![hash_str, subject_str, issued_str, expires_str],
        )?;
        Ok(())
      })
      .await?;

    tracing::debug!(subject_id = %subject_id, %expires_at, "session recorded");
    Ok(())
  }

  /// Remove a session. Returns `false` if the token was unknown.
  pub async fn revoke_session(&self, token: &str) -> Result<bool> {
    let hash_str = hash_token(token);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM sessions WHERE token_hash = ?1",
          rusqlite::params![hash_str],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }
}

// ─── IdentityStore impl ──────────────────────────────────────────────────────

impl IdentityStore for SqliteStore {
  type Error = Error;

  async fn add_subject(&self, canonical_id: CanonicalId) -> Result<Subject> {
    let subject = Subject {
      subject_id: SubjectId::new(),
      canonical_id,
      created_at: Utc::now(),
    };

    let id_str        = encode_subject_id(subject.subject_id);
    let canonical_str = subject.canonical_id.as_str().to_owned();
    let at_str        = encode_dt(subject.created_at);

    let inserted = self
      .conn
      .call(move |conn| {
        let taken = conn
          .query_row(
            "SELECT 1 FROM subjects WHERE canonical_id = ?1",
            rusqlite::params![canonical_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if taken {
          return Ok(false);
        }

        conn.execute(
          "INSERT INTO subjects (subject_id, canonical_id, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, canonical_str, at_str],
        )?;
        Ok(true)
      })
      .await?;

    if !inserted {
      return Err(Error::SubjectExists(subject.canonical_id));
    }

    tracing::info!(
      subject_id = %subject.subject_id,
      canonical_id = %subject.canonical_id,
      "subject created"
    );
    Ok(subject)
  }

  async fn get_subject(&self, id: SubjectId) -> Result<Option<Subject>> {
    let id_str = encode_subject_id(id);

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT subject_id, canonical_id, created_at
             FROM subjects WHERE subject_id = ?1",
            rusqlite::params![id_str],
            RawSubject::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn find_subject(&self, canonical_id: &CanonicalId) -> Result<Option<Subject>> {
    let canonical_str = canonical_id.as_str().to_owned();

    let raw: Option<RawSubject> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT subject_id, canonical_id, created_at
             FROM subjects WHERE canonical_id = ?1",
            rusqlite::params![canonical_str],
            RawSubject::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSubject::into_subject).transpose()
  }

  async fn assign_role(&self, subject_id: SubjectId, role: Role) -> Result<RoleRecord> {
    let id_str   = encode_subject_id(subject_id);
    let role_str = role.as_str();
    let at_str   = encode_dt(Utc::now());

    let exists = self
      .conn
      .call(move |conn| {
        let exists = conn
          .query_row(
            "SELECT 1 FROM subjects WHERE subject_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if !exists {
          return Ok(false);
        }

        conn.execute(
          "INSERT INTO role_records (subject_id, role, updated_at)
           VALUES (?1, ?2, ?3)
           ON CONFLICT (subject_id) DO UPDATE
             SET role = excluded.role, updated_at = excluded.updated_at",
          rusqlite::params![id_str, role_str, at_str],
        )?;
        Ok(true)
      })
      .await?;

    if !exists {
      return Err(Error::SubjectNotFound(subject_id));
    }

    tracing::info!(subject_id = %subject_id, role = %role, "role assigned");
    Ok(RoleRecord { subject_id, role })
  }
}
