use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::models::user::User;
use crate::responses::JsonResponse;
use crate::services::auth_client::SessionVerifyError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SessionRequest {
    pub session_id: String,
}

/// Exchanges a session id with the upstream provider and creates or
/// refreshes the matching user. New accounts start as customers; returning
/// accounts get their session token rotated.
pub async fn handle_verify_session(
    State(state): State<AppState>,
    Json(payload): Json<SessionRequest>,
) -> Response {
    let data = match state.auth.verify(&payload.session_id).await {
        Ok(data) => data,
        Err(SessionVerifyError::Rejected) => {
            return JsonResponse::unauthorized("Invalid session").into_response();
        }
        Err(SessionVerifyError::Unavailable(reason)) => {
            error!("auth provider unavailable: {reason}");
            return JsonResponse::bad_gateway("Authentication provider unavailable")
                .into_response();
        }
    };

    match state.db.find_user_by_email(&data.email).await {
        Ok(Some(mut user)) => {
            if let Err(e) = state.db.update_session_token(user.id, &data.session_token).await {
                error!("failed to rotate session token: {e:?}");
                return JsonResponse::server_error("Database error").into_response();
            }
            user.session_token = Some(data.session_token.clone());
            Json(json!({
                "user": user,
                "session_token": data.session_token,
                "is_new_user": false,
            }))
            .into_response()
        }
        Ok(None) => {
            let user = User::from_session(&data);
            if let Err(e) = state.db.insert_user(&user).await {
                error!("failed to create user: {e:?}");
                return JsonResponse::server_error("Database error").into_response();
            }
            Json(json!({
                "user": user,
                "session_token": data.session_token,
                "is_new_user": true,
            }))
            .into_response()
        }
        Err(e) => {
            error!("user lookup failed: {e:?}");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}
