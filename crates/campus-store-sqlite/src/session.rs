//! The two role-resolution collaborators backed by SQLite.
//!
//! [`SessionLookup`] stands in for the cookie-scoped database session: it can
//! only see the `sessions` table. [`PrivilegedRoleReader`] reads
//! `role_records`, which a session-scoped caller is not allowed to read.

use campus_core::{RoleRecord, RoleRecordReader, SessionSource, SubjectId};
use chrono::Utc;
use rusqlite::OptionalExtension as _;

use crate::{
  Error,
  encode::{RawRoleRecord, decode_dt, decode_subject_id, encode_subject_id},
};

// ─── SessionLookup ───────────────────────────────────────────────────────────

/// Request-scoped [`SessionSource`] for a single cookie token.
///
/// Created by [`crate::SqliteStore::session`]; holds the token's hash only.
pub struct SessionLookup {
  conn:       tokio_rusqlite::Connection,
  token_hash: Option<String>,
}

impl SessionLookup {
  pub(crate) fn new(
    conn: tokio_rusqlite::Connection,
    token_hash: Option<String>,
  ) -> Self {
    Self { conn, token_hash }
  }
}

impl SessionSource for SessionLookup {
  type Error = Error;

  /// Unknown, revoked and expired tokens all mean "not authenticated".
  async fn authenticated_subject(&self) -> Result<Option<SubjectId>, Error> {
    let Some(hash_str) = self.token_hash.clone() else {
      return Ok(None);
    };

    let row: Option<(String, String)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT subject_id, expires_at FROM sessions WHERE token_hash = ?1",
            rusqlite::params![hash_str],
            |row| Ok((row.get(0)?, row.get(1)?)),
          )
          .optional()?)
      })
      .await?;

    let Some((subject_str, expires_str)) = row else {
      return Ok(None);
    };

    if decode_dt(&expires_str)? <= Utc::now() {
      return Ok(None);
    }

    Ok(Some(decode_subject_id(&subject_str)?))
  }
}

// ─── PrivilegedRoleReader ────────────────────────────────────────────────────

/// [`RoleRecordReader`] with unrestricted read access to `role_records`.
///
/// Reachable only inside the resolver from [`crate::SqliteStore::role_resolver`].
/// Only role records whose subject still exists are returned.
pub struct PrivilegedRoleReader {
  conn: tokio_rusqlite::Connection,
}

impl PrivilegedRoleReader {
  pub(crate) fn new(conn: tokio_rusqlite::Connection) -> Self { Self { conn } }
}

impl RoleRecordReader for PrivilegedRoleReader {
  type Error = Error;

  async fn read_role_record(
    &self,
    subject_id: SubjectId,
  ) -> Result<Option<RoleRecord>, Error> {
    let id_str = encode_subject_id(subject_id);

    let raw: Option<RawRoleRecord> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT r.subject_id, r.role
             FROM role_records r
             JOIN subjects s ON s.subject_id = r.subject_id
             WHERE r.subject_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawRoleRecord {
                subject_id: row.get(0)?,
                role:       row.get(1)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawRoleRecord::into_record).transpose()
  }
}
