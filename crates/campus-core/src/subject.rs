//! Subject — an authenticated account in the identity store.
//!
//! Subjects are created out-of-band by the login flow. This crate references
//! them but never mutates them.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, handle::CanonicalId};

/// Opaque, stable, never-reused identifier assigned at account creation.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct SubjectId(Uuid);

impl SubjectId {
  pub fn new() -> Self { Self(Uuid::new_v4()) }

  pub fn as_uuid(&self) -> Uuid { self.0 }
}

impl Default for SubjectId {
  fn default() -> Self { Self::new() }
}

impl From<Uuid> for SubjectId {
  fn from(id: Uuid) -> Self { Self(id) }
}

impl FromStr for SubjectId {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(Self(Uuid::parse_str(s)?))
  }
}

impl fmt::Display for SubjectId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.0.hyphenated(), f)
  }
}

/// A row of the identity store's subject table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
  pub subject_id:   SubjectId,
  pub canonical_id: CanonicalId,
  pub created_at:   DateTime<Utc>,
}
