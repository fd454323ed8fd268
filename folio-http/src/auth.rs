use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use folio_core::domain::UserId;
use tracing::debug;

use super::error::AppError;
use super::state::AppState;

/// Identity for endpoints open to anonymous readers: a missing or failed
/// token degrades to `None` instead of rejecting the request.
pub struct Viewer(pub Option<UserId>);

impl FromRequestParts<Arc<AppState>> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        match state.tokens.from_carrier(&parts.headers) {
            Ok(user_id) => Ok(Viewer(Some(user_id))),
            Err(reason) => {
                debug!(%reason, "serving request anonymously");
                Ok(Viewer(None))
            }
        }
    }
}

/// Identity for endpoints that require a verified session.
pub struct Authenticated(pub UserId);

impl FromRequestParts<Arc<AppState>> for Authenticated {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        Ok(Authenticated(state.tokens.from_carrier(&parts.headers)?))
    }
}
