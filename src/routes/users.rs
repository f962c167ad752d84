use axum::{
    extract::Json,
    response::{IntoResponse, Response},
};

use crate::routes::auth::session::AuthUser;

/// Current-user lookup. The session token never appears in the body; the
/// serializer skips it.
pub async fn handle_me(AuthUser(user): AuthUser) -> Response {
    Json(user).into_response()
}
