use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::domain::error::DomainError;
use crate::domain::user::{Actor, Role};
use crate::presentation::AppState;
use crate::presentation::app_error::AppError;

/// Identity attached by `jwt_auth_middleware` for protected routes.
#[derive(Debug, Clone, Copy)]
pub(crate) struct AuthenticatedUser {
    pub(crate) user_id: i64,
    pub(crate) role: Role,
}

impl AuthenticatedUser {
    pub(crate) fn actor(&self) -> Actor {
        Actor {
            id: self.user_id,
            role: self.role,
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}

/// Best-effort identity for public routes whose response depends on who is
/// asking. An absent or invalid token is simply no identity.
#[derive(Debug, Clone, Copy)]
pub(crate) struct OptionalUser(pub(crate) Option<AuthenticatedUser>);

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = bearer_token(&parts.headers)
            .and_then(|token| state.jwt.verify_token(token).ok())
            .map(|claims| AuthenticatedUser {
                user_id: claims.user_id,
                role: claims.role,
            });
        Ok(OptionalUser(identity))
    }
}

pub(crate) async fn jwt_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;
    let claims = state
        .jwt
        .verify_token(token)
        .map_err(|_| AppError::Unauthorized)?;

    request.extensions_mut().insert(AuthenticatedUser {
        user_id: claims.user_id,
        role: claims.role,
    });

    Ok(next.run(request).await)
}

/// Layered after `jwt_auth_middleware` on admin-only routes.
pub(crate) async fn admin_only_middleware(
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<AuthenticatedUser>()
        .copied()
        .ok_or(AppError::Unauthorized)?;
    if user.role != Role::Admin {
        return Err(AppError::Domain(DomainError::Forbidden));
    }
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth_header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;

    let mut parts = auth_header.split_whitespace();
    let scheme = parts.next()?;
    let token = parts.next()?;
    if parts.next().is_some() || !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token)
}
