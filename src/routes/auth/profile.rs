use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::error;

use crate::models::company::Company;
use crate::models::provider::ServiceProvider;
use crate::models::user::UserRole;
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthUser;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CompleteProfilePayload {
    #[serde(flatten)]
    pub role: UserRole,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// One-shot role selection after the first login. Choosing the company
/// role creates the owned company; choosing freelance fixer creates the
/// provider profile with default rates. Never both.
pub async fn handle_complete_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<CompleteProfilePayload>,
) -> Response {
    if user.role != UserRole::Customer {
        return JsonResponse::conflict("Profile already completed").into_response();
    }
    if matches!(payload.role, UserRole::EmployeeFixer { .. }) {
        return JsonResponse::bad_request("Employees are added by their company").into_response();
    }

    if let Err(e) = state
        .db
        .complete_profile(
            user.id,
            &payload.role,
            payload.phone.as_deref(),
            payload.address.as_deref(),
        )
        .await
    {
        error!("failed to update profile: {e:?}");
        return JsonResponse::server_error("Database error").into_response();
    }

    let side_effect = match payload.role {
        UserRole::Company => {
            let company = Company::owned_by(&user, payload.phone.as_deref(), payload.address.as_deref());
            state.db.insert_company(&company).await
        }
        UserRole::FreelanceFixer => {
            let provider = ServiceProvider::freelance(user.id);
            state.db.insert_provider(&provider).await
        }
        _ => Ok(()),
    };

    if let Err(e) = side_effect {
        error!("failed to create role record: {e:?}");
        return JsonResponse::server_error("Database error").into_response();
    }

    JsonResponse::success("Profile completed successfully").into_response()
}

#[cfg(test)]
mod tests {
    use axum::extract::{Json, State};
    use axum::http::StatusCode;
    use std::sync::Arc;

    use super::{handle_complete_profile, CompleteProfilePayload};
    use crate::db::memory::MemoryStore;
    use crate::db::repository::MarketRepository;
    use crate::models::provider::{DEFAULT_EMERGENCY_RATE, DEFAULT_HOURLY_RATE};
    use crate::models::user::UserRole;
    use crate::routes::auth::session::AuthUser;
    use crate::test_support::{app_state, sample_customer, seed_user};

    fn payload(role: UserRole) -> CompleteProfilePayload {
        CompleteProfilePayload {
            role,
            phone: Some("+961 1 234567".to_string()),
            address: Some("Beirut".to_string()),
        }
    }

    #[tokio::test]
    async fn company_role_creates_exactly_one_owned_company() {
        let store = Arc::new(MemoryStore::new());
        let user = seed_user(&store, sample_customer("omar")).await;
        let state = app_state(store.clone());

        let response = handle_complete_profile(
            State(state),
            AuthUser(user.clone()),
            Json(payload(UserRole::Company)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(store.companies_owned_by(user.id), 1);
        assert_eq!(store.providers_for(user.id), 0);

        let company = store.find_company_by_owner(user.id).await.unwrap().unwrap();
        assert_eq!(company.name, format!("{}'s Company", user.name));
        assert_eq!(company.email, user.email);
    }

    #[tokio::test]
    async fn freelance_role_creates_a_provider_with_default_rates() {
        let store = Arc::new(MemoryStore::new());
        let user = seed_user(&store, sample_customer("nour")).await;
        let state = app_state(store.clone());

        let response = handle_complete_profile(
            State(state),
            AuthUser(user.clone()),
            Json(payload(UserRole::FreelanceFixer)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        assert_eq!(store.companies_owned_by(user.id), 0);
        let provider = store.find_provider_by_user(user.id).await.unwrap().unwrap();
        assert_eq!(provider.hourly_rate, Some(DEFAULT_HOURLY_RATE));
        assert_eq!(provider.emergency_rate, Some(DEFAULT_EMERGENCY_RATE));

        let updated = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(updated.role, UserRole::FreelanceFixer);
    }

    #[tokio::test]
    async fn completing_twice_conflicts() {
        let store = Arc::new(MemoryStore::new());
        let user = seed_user(&store, sample_customer("sami")).await;
        let state = app_state(store.clone());

        let first = handle_complete_profile(
            State(state.clone()),
            AuthUser(user.clone()),
            Json(payload(UserRole::Company)),
        )
        .await;
        assert_eq!(first.status(), StatusCode::OK);

        let updated = store.find_user_by_id(user.id).await.unwrap().unwrap();
        let second = handle_complete_profile(
            State(state),
            AuthUser(updated),
            Json(payload(UserRole::FreelanceFixer)),
        )
        .await;
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(store.companies_owned_by(user.id), 1);
        assert_eq!(store.providers_for(user.id), 0);
    }

    #[tokio::test]
    async fn employee_role_cannot_be_self_assigned() {
        let store = Arc::new(MemoryStore::new());
        let user = seed_user(&store, sample_customer("jad")).await;
        let state = app_state(store.clone());

        let response = handle_complete_profile(
            State(state),
            AuthUser(user.clone()),
            Json(payload(UserRole::EmployeeFixer {
                company_id: uuid::Uuid::new_v4(),
            })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let unchanged = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(unchanged.role, UserRole::Customer);
    }
}
