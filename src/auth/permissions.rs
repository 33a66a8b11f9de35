//! Role guards for protected routes.
//!
//! The guard is an extractor rather than per-handler checks: declaring
//! `RequiresAdmin` in the handler signature runs the role check before the
//! handler body executes, so the mutation endpoints cannot forget it.

use crate::{
    AppState,
    api::models::users::CurrentUser,
    errors::{Error, Result},
    types::{Operation, Resource},
};
use axum::{extract::FromRequestParts, http::request::Parts};

/// Authenticated caller with the ADMIN role. Rejects with 401 when no valid
/// credentials are present and 403 when the caller is not an admin.
pub struct RequiresAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for RequiresAdmin {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            // The guard cannot know which operation the route performs, only
            // which resource group it belongs to
            let resource = resource_from_path(parts.uri.path());
            return Err(Error::InsufficientPermissions {
                action: operation_from_method(parts.method.as_str()),
                resource,
            });
        }

        Ok(Self(user))
    }
}

fn operation_from_method(method: &str) -> Operation {
    match method {
        "POST" => Operation::Create,
        "PUT" | "PATCH" => Operation::Update,
        "DELETE" => Operation::Delete,
        _ => Operation::Read,
    }
}

fn resource_from_path(path: &str) -> Resource {
    if path.starts_with("/advices") {
        Resource::Advices
    } else if path.starts_with("/user") {
        Resource::Users
    } else {
        Resource::Weather
    }
}
