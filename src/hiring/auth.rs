//! Bearer-token authentication and role checks.
//!
//! Token issuance lives outside this service; here a token is only an opaque
//! string resolved against the user table. Missing or unknown tokens map to
//! 401, a known user with the wrong role to 403.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use crate::error::ApiError;

use super::domain::User;
use super::repository::HiringRepository;

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve the request's bearer token to an active user.
pub fn authenticate<R: HiringRepository>(
    repository: &R,
    headers: &HeaderMap,
) -> Result<User, ApiError> {
    let token = bearer_token(headers).ok_or(ApiError::Unauthorized)?;
    repository
        .find_user_by_token(token)?
        .ok_or(ApiError::Unauthorized)
}

pub fn require_manage(user: &User) -> Result<(), ApiError> {
    if user.role.can_manage() {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

pub fn require_admin(user: &User) -> Result<(), ApiError> {
    if user.role.is_admin() {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}
