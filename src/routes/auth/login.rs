use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Deserialize)]
pub struct AuthRequest {
    pub host_url: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub auth_url: String,
}

/// Hands the client the external provider's login URL with a redirect
/// back to the caller's own auth callback.
pub async fn handle_login(
    State(state): State<AppState>,
    Json(payload): Json<AuthRequest>,
) -> Response {
    let redirect = format!("{}/auth/callback", payload.host_url.trim_end_matches('/'));
    let auth_url = format!(
        "{}?redirect={}",
        state.config.auth_login_url,
        urlencoding::encode(&redirect)
    );
    Json(AuthResponse { auth_url }).into_response()
}

#[cfg(test)]
mod tests {
    use axum::extract::{Json, State};
    use std::sync::Arc;

    use super::{handle_login, AuthRequest};
    use crate::db::memory::MemoryStore;
    use crate::test_support::{app_state, body_json};

    #[tokio::test]
    async fn auth_url_points_back_to_the_caller() {
        let state = app_state(Arc::new(MemoryStore::new()));

        let response = handle_login(
            State(state),
            Json(AuthRequest {
                host_url: "https://app.example.com/".to_string(),
            }),
        )
        .await;

        let body = body_json(response).await;
        let auth_url = body["auth_url"].as_str().unwrap();
        assert!(auth_url.starts_with("https://auth.test/"));
        assert!(auth_url.contains("redirect="));
        assert!(auth_url.contains(&*urlencoding::encode("https://app.example.com/auth/callback")));
    }
}
