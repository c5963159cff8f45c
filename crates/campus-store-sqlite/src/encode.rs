//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, ids are hyphenated lowercase UUIDs, roles
//! are their snake_case names and session tokens are stored as SHA-256 hex.

use campus_core::{CanonicalId, Role, RoleRecord, Subject, SubjectId};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{Error, Result};

// ─── SubjectId ───────────────────────────────────────────────────────────────

pub fn encode_subject_id(id: SubjectId) -> String { id.to_string() }

pub fn decode_subject_id(s: &str) -> Result<SubjectId> {
  Ok(SubjectId::from(Uuid::parse_str(s)?))
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Session tokens ──────────────────────────────────────────────────────────

pub fn hash_token(token: &str) -> String {
  hex::encode(Sha256::digest(token.as_bytes()))
}

// ─── Raw rows ────────────────────────────────────────────────────────────────

/// A `subjects` row before decoding.
pub struct RawSubject {
  pub subject_id:   String,
  pub canonical_id: String,
  pub created_at:   String,
}

impl RawSubject {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      subject_id:   row.get(0)?,
      canonical_id: row.get(1)?,
      created_at:   row.get(2)?,
    })
  }

  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      subject_id:   decode_subject_id(&self.subject_id)?,
      canonical_id: CanonicalId::from_stored(self.canonical_id),
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// A `role_records` row before decoding.
pub struct RawRoleRecord {
  pub subject_id: String,
  pub role:       String,
}

impl RawRoleRecord {
  /// Fails on an unknown role string: a malformed record never becomes a
  /// [`RoleRecord`].
  pub fn into_record(self) -> Result<RoleRecord> {
    Ok(RoleRecord {
      subject_id: decode_subject_id(&self.subject_id)?,
      role:       self.role.parse::<Role>()?,
    })
  }
}
