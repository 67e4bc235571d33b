//! Bearer-token authentication and explicit role authorization.
//!
//! The identity provider itself is an external collaborator behind the
//! [`TokenVerifier`] seam; this module only turns a verified token into a
//! [`Principal`] request extension and checks required roles.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::workflows::matching::domain::{Role, UserId};
use crate::workflows::matching::router::envelope_error;

/// The authenticated caller: identity plus the single role fixed at account
/// creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

/// Seam for the external identity provider's token verification.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Principal, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid or expired bearer token")]
    InvalidToken,
    #[error("role {actual} is not permitted to call this endpoint")]
    Forbidden { actual: Role },
}

impl AuthError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingToken | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        envelope_error(self.status(), self.to_string())
    }
}

/// Check the principal's role against the set an endpoint requires. An empty
/// set admits any authenticated principal.
pub fn authorize(required: &[Role], principal: &Principal) -> Result<(), AuthError> {
    if required.is_empty() || required.contains(&principal.role) {
        return Ok(());
    }

    Err(AuthError::Forbidden {
        actual: principal.role,
    })
}

/// Middleware resolving `Authorization: Bearer <token>` into a [`Principal`]
/// extension. Requests without a verifiable token never reach the handlers.
pub async fn require_bearer<V>(
    State(verifier): State<Arc<V>>,
    mut request: Request,
    next: Next,
) -> Response
where
    V: TokenVerifier + 'static,
{
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| raw.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());

    let Some(token) = token else {
        warn!("request rejected: no bearer token presented");
        return AuthError::MissingToken.into_response();
    };

    match verifier.verify(token) {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(err) => {
            warn!(error = %err, "request rejected: token verification failed");
            err.into_response()
        }
    }
}
