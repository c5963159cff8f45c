//! Session-cookie extractors backed by the role resolver.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use campus_core::{Resolution, ResolvedIdentity};

use crate::{AppState, error::Error};

/// Present in a handler means the caller's role was resolved.
pub struct CurrentIdentity(pub ResolvedIdentity);

/// Present in a handler means the caller holds an elevated role.
pub struct Elevated(pub ResolvedIdentity);

/// The value of cookie `name`, searching every `Cookie` header.
/// Empty values are treated as absent.
pub fn session_token<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
  headers
    .get_all(header::COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|v| v.split(';'))
    .find_map(|pair| {
      let (key, value) = pair.trim().split_once('=')?;
      (key == name && !value.is_empty()).then_some(value)
    })
}

/// Resolve the caller's role for this request's headers.
pub async fn resolve(headers: &HeaderMap, state: &AppState) -> Resolution {
  let token = session_token(headers, &state.config.session_cookie);
  let session = state.store.session(token);
  state.resolver.resolve_current_role(&session).await
}

impl FromRequestParts<AppState> for CurrentIdentity {
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState,
  ) -> Result<Self, Self::Rejection> {
    match resolve(&parts.headers, state).await {
      Resolution::Resolved(identity) => Ok(CurrentIdentity(identity)),
      Resolution::Unresolved => Err(Error::Unauthorized),
    }
  }
}

impl FromRequestParts<AppState> for Elevated {
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState,
  ) -> Result<Self, Self::Rejection> {
    let CurrentIdentity(identity) =
      CurrentIdentity::from_request_parts(parts, state).await?;

    if !identity.is_elevated() {
      tracing::info!(
        subject_id = %identity.subject_id,
        role = %identity.role,
        "elevated role required"
      );
      return Err(Error::Forbidden);
    }
    Ok(Elevated(identity))
  }
}
