use axum::{
    extract::{Json, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::error;

use crate::db::repository::ProviderProfileUpdate;
use crate::models::category::ServiceCategory;
use crate::models::user::UserRole;
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthUser;
use crate::services::enrichment::enrich_provider;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ProviderQuery {
    pub category: Option<ServiceCategory>,
}

/// Public provider directory, optionally filtered by service category.
pub async fn handle_list_providers(
    State(state): State<AppState>,
    Query(query): Query<ProviderQuery>,
) -> Response {
    let providers = match state.db.list_providers(query.category).await {
        Ok(providers) => providers,
        Err(e) => {
            error!("provider listing failed: {e:?}");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    let mut enriched = Vec::with_capacity(providers.len());
    for provider in providers {
        match enrich_provider(&*state.db, provider).await {
            Ok(e) => enriched.push(e),
            Err(e) => {
                error!("provider enrichment failed: {e:?}");
                return JsonResponse::server_error("Database error").into_response();
            }
        }
    }

    Json(enriched).into_response()
}

#[derive(Deserialize)]
pub struct ProviderProfilePayload {
    pub service_categories: Vec<ServiceCategory>,
    pub hourly_rate: Option<f64>,
    pub emergency_rate: Option<f64>,
    pub description: Option<String>,
    pub working_hours: Option<Value>,
}

/// Provider self-service profile update. Employees cannot set their own
/// pay, so their rate fields are dropped before hitting the store.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<ProviderProfilePayload>,
) -> Response {
    if !user.role.is_fixer() {
        return JsonResponse::forbidden("Not authorized").into_response();
    }

    match state.db.find_provider_by_user(user.id).await {
        Ok(Some(_)) => {}
        Ok(None) => return JsonResponse::not_found("Provider profile not found").into_response(),
        Err(e) => {
            error!("provider lookup failed: {e:?}");
            return JsonResponse::server_error("Database error").into_response();
        }
    }

    let self_employed = user.role == UserRole::FreelanceFixer;
    let update = ProviderProfileUpdate {
        service_categories: payload.service_categories,
        description: payload.description,
        availability: payload.working_hours.unwrap_or_else(|| Value::Object(Default::default())),
        hourly_rate: payload.hourly_rate.filter(|_| self_employed),
        emergency_rate: payload.emergency_rate.filter(|_| self_employed),
    };

    match state.db.update_provider_profile(user.id, &update).await {
        Ok(()) => JsonResponse::success("Profile updated successfully").into_response(),
        Err(e) => {
            error!("provider update failed: {e:?}");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}
