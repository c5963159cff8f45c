//! `GET /handles/{handle}` — translate a login handle to its canonical id.
//!
//! Used by the login flow before it talks to the identity store. Invalid
//! handles are rejected with 400 and never normalised.

use axum::{Json, extract::Path};
use campus_core::{CanonicalId, Handle};
use serde::Serialize;

use crate::error::Error;

#[derive(Debug, Serialize)]
pub struct HandleBody {
  pub handle:       Handle,
  pub canonical_id: CanonicalId,
}

pub async fn canonical(Path(raw): Path<String>) -> Result<Json<HandleBody>, Error> {
  let handle = Handle::parse(&raw).map_err(|e| Error::BadRequest(e.to_string()))?;
  let canonical_id = handle.canonical();
  Ok(Json(HandleBody { handle, canonical_id }))
}
