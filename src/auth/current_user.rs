//! Extractor for the authenticated user.

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

/// Extract user from a bearer JWT in the Authorization header if present.
/// Returns:
/// - None: No Authorization header or not a Bearer token
/// - Some(Ok(user)): Valid token found and verified
/// - Some(Err(error)): Bearer token present but invalid/expired
fn try_bearer_auth(parts: &Parts, config: &crate::config::Config) -> Option<Result<CurrentUser>> {
    let auth_header = parts.headers.get(axum::http::header::AUTHORIZATION)?;

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid authorization header: {e}"),
            }));
        }
    };

    // Not a Bearer token: treat as absent credentials
    let token = auth_str.strip_prefix("Bearer ")?;

    Some(session::verify_session_token(token, config))
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        match try_bearer_auth(parts, &state.config) {
            Some(Ok(user)) => {
                debug!("Authenticated user: {}", user.id);
                Ok(user)
            }
            Some(Err(e)) => {
                trace!("Bearer authentication failed: {:?}", e);
                Err(e)
            }
            None => {
                trace!("No authentication credentials found in request");
                Err(Error::Unauthenticated { message: None })
            }
        }
    }
}
