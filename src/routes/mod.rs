pub mod auth;
pub mod bookings;
pub mod companies;
pub mod providers;
pub mod users;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/api/auth/login", post(auth::handle_login))
        .route("/api/auth/session", post(auth::handle_verify_session))
        .route("/api/auth/complete-profile", post(auth::handle_complete_profile))
        .route("/api/users/me", get(users::handle_me))
        .route("/api/providers", get(providers::handle_list_providers))
        .route("/api/providers/profile", post(providers::handle_update_profile))
        .route("/api/companies/my-company", get(companies::handle_my_company))
        .route("/api/companies/add-employee", post(companies::handle_add_employee))
        .route(
            "/api/bookings",
            post(bookings::handle_create_booking).get(bookings::handle_list_bookings),
        )
        .route("/api/bookings/{id}/status", put(bookings::handle_update_status))
}

async fn root() -> &'static str {
    "LebFix Service Marketplace API"
}
