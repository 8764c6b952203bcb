use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::errors::AppError;

/// Header carrying the caller's organization, set by the upstream gateway
/// once the request is authenticated.
pub const ORG_HEADER: &str = "x-org-id";

/// Header carrying the authenticated user, when the gateway knows one.
pub const USER_HEADER: &str = "x-user-id";

/// Organization context of an authenticated request. Trusted as given.
#[derive(Debug, Clone)]
pub struct Tenant {
    pub org_id: String,
    /// Recorded as the author of versions written by this request.
    pub user_id: Option<String>,
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Tenant {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let org_id = header_value(parts, ORG_HEADER).ok_or(AppError::Unauthorized)?;

        Ok(Tenant {
            org_id: org_id.to_string(),
            user_id: header_value(parts, USER_HEADER).map(str::to_string),
        })
    }
}
