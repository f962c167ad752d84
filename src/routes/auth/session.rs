use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use tracing::error;

use crate::models::user::User;
use crate::responses::JsonResponse;
use crate::state::AppState;

/// Resolves the bearer token to a stored user. Token validity is binary:
/// either some user carries it as their session token or the request is
/// rejected. Issuance, expiry and revocation all live upstream.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| JsonResponse::unauthorized("Missing authentication token").into_response())?;

        match state.db.find_user_by_session_token(bearer.token()).await {
            Ok(Some(user)) => Ok(AuthUser(user)),
            Ok(None) => {
                Err(JsonResponse::unauthorized("Invalid authentication token").into_response())
            }
            Err(e) => {
                error!("session token lookup failed: {e:?}");
                Err(JsonResponse::server_error("Database error").into_response())
            }
        }
    }
}
