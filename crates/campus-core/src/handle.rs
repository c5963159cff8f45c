//! Identity Normalizer — login handles and their canonical identifiers.
//!
//! The identity store keys accounts by an email-shaped canonical identifier.
//! People type a short handle. Both directions of that mapping live here so
//! the login flow and anything that displays a stored identifier never drift.

use std::{fmt, sync::LazyLock};

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Domain suffix appended to every canonical identifier.
pub const CANONICAL_SUFFIX: &str = "@school.local";

static HANDLE_RE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^[A-Za-z][A-Za-z0-9_]{2,19}$").expect("handle pattern compiles")
});

/// `true` iff `handle` starts with a letter, is 3–20 characters long, and
/// contains only ASCII letters, digits and underscores.
///
/// Checked against the raw text: surrounding whitespace makes a handle
/// invalid. Callers must reject invalid handles before normalising them.
pub fn is_valid_handle(handle: &str) -> bool { HANDLE_RE.is_match(handle) }

/// Trim, lower-case and append [`CANONICAL_SUFFIX`].
///
/// Pure and infallible; syntax is enforced by [`is_valid_handle`], not here.
pub fn to_canonical(handle: &str) -> CanonicalId {
  let mut id = handle.trim().to_lowercase();
  id.push_str(CANONICAL_SUFFIX);
  CanonicalId(id)
}

/// Strip [`CANONICAL_SUFFIX`]. Input without the suffix is returned as-is.
pub fn from_canonical(canonical_id: &str) -> String {
  canonical_id
    .strip_suffix(CANONICAL_SUFFIX)
    .unwrap_or(canonical_id)
    .to_owned()
}

// ─── CanonicalId ─────────────────────────────────────────────────────────────

/// The identity store's native key for a subject.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalId(String);

impl CanonicalId {
  /// Wrap an identifier read back from the store.
  pub fn from_stored(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }

  /// The login handle this identifier was derived from.
  pub fn handle(&self) -> String { from_canonical(&self.0) }
}

impl fmt::Display for CanonicalId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Handle ──────────────────────────────────────────────────────────────────

/// A login handle that has passed [`is_valid_handle`], stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
  /// Validate first, then normalise. Invalid input never reaches
  /// [`to_canonical`].
  pub fn parse(raw: &str) -> Result<Self> {
    if !is_valid_handle(raw) {
      return Err(Error::InvalidHandle(raw.to_owned()));
    }
    Ok(Self(raw.to_lowercase()))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  pub fn canonical(&self) -> CanonicalId { to_canonical(&self.0) }
}

impl fmt::Display for Handle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
