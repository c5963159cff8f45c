//! Handlers for `/me` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/me` | The caller's subject id, handle and role; 401 if unresolved |
//! | `GET`  | `/me/elevated` | 204 for owner/admin, 403 for other roles, 401 if unresolved |

use axum::{Json, extract::State, http::StatusCode};
use campus_core::{Role, SubjectId, store::IdentityStore};
use serde::Serialize;

use crate::{
  AppState,
  auth::{CurrentIdentity, Elevated},
  error::Error,
};

#[derive(Debug, Serialize)]
pub struct MeBody {
  pub subject_id: SubjectId,
  /// `None` if the subject row disappeared after the role was resolved.
  pub handle:     Option<String>,
  pub role:       Role,
  pub elevated:   bool,
}

/// `GET /me`
pub async fn current(
  State(state): State<AppState>,
  CurrentIdentity(identity): CurrentIdentity,
) -> Result<Json<MeBody>, Error> {
  let subject = state.store.get_subject(identity.subject_id).await?;

  Ok(Json(MeBody {
    subject_id: identity.subject_id,
    handle:     subject.map(|s| s.canonical_id.handle()),
    role:       identity.role,
    elevated:   identity.is_elevated(),
  }))
}

/// `GET /me/elevated`
pub async fn elevated(Elevated(_): Elevated) -> StatusCode { StatusCode::NO_CONTENT }
