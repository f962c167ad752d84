use axum::{
    extract::{Json, Path, State},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use tracing::error;
use uuid::Uuid;

use crate::db::repository::BookingScope;
use crate::models::booking::{Booking, BookingStatus};
use crate::models::category::ServiceCategory;
use crate::models::user::{User, UserRole};
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthUser;
use crate::services::enrichment::enrich_booking;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct BookingCreate {
    pub provider_id: Uuid,
    pub service_category: ServiceCategory,
    pub description: String,
    pub scheduled_date: DateTime<Utc>,
    pub location: Value,
    #[serde(default)]
    pub emergency: bool,
}

/// Customer books a provider. Price is fixed here from the provider's
/// hourly or emergency rate and never recomputed; the provider's company
/// id is copied onto the booking for later scoping.
pub async fn handle_create_booking(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<BookingCreate>,
) -> Response {
    if user.role != UserRole::Customer {
        return JsonResponse::forbidden("Only customers can create bookings").into_response();
    }

    let provider = match state.db.find_provider_by_id(payload.provider_id).await {
        Ok(Some(provider)) => provider,
        Ok(None) => return JsonResponse::not_found("Service provider not found").into_response(),
        Err(e) => {
            error!("provider lookup failed: {e:?}");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    let booking = Booking::create(
        user.id,
        &provider,
        payload.service_category,
        payload.description,
        payload.scheduled_date,
        payload.location,
        payload.emergency,
    );

    match state.db.insert_booking(&booking).await {
        Ok(()) => Json(booking).into_response(),
        Err(e) => {
            error!("booking insert failed: {e:?}");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

/// The slice of the ledger the caller may see: customers their own
/// bookings, fixers the ones assigned to their provider profile, company
/// owners everything booked against their company.
async fn scope_for(state: &AppState, user: &User) -> Result<Option<BookingScope>, sqlx::Error> {
    match &user.role {
        UserRole::Customer => Ok(Some(BookingScope::Customer(user.id))),
        UserRole::FreelanceFixer | UserRole::EmployeeFixer { .. } => Ok(state
            .db
            .find_provider_by_user(user.id)
            .await?
            .map(|p| BookingScope::Provider(p.id))),
        UserRole::Company => Ok(state
            .db
            .find_company_by_owner(user.id)
            .await?
            .map(|c| BookingScope::Company(c.id))),
    }
}

pub async fn handle_list_bookings(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Response {
    let scope = match scope_for(&state, &user).await {
        Ok(Some(scope)) => scope,
        // A fixer without a provider profile or an owner without a company
        // simply has nothing to see.
        Ok(None) => return Json(Vec::<Value>::new()).into_response(),
        Err(e) => {
            error!("booking scope lookup failed: {e:?}");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    let bookings = match state.db.list_bookings(scope).await {
        Ok(bookings) => bookings,
        Err(e) => {
            error!("booking listing failed: {e:?}");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    let mut enriched = Vec::with_capacity(bookings.len());
    for booking in bookings {
        match enrich_booking(&*state.db, booking).await {
            Ok(e) => enriched.push(e),
            Err(e) => {
                error!("booking enrichment failed: {e:?}");
                return JsonResponse::server_error("Database error").into_response();
            }
        }
    }

    Json(enriched).into_response()
}

#[derive(Deserialize)]
pub struct StatusUpdate {
    pub status: BookingStatus,
}

/// Status change by the booking's customer or its assigned provider.
/// Company owners get visibility through listing but no control here.
pub async fn handle_update_status(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(booking_id): Path<Uuid>,
    Json(payload): Json<StatusUpdate>,
) -> Response {
    let booking = match state.db.find_booking_by_id(booking_id).await {
        Ok(Some(booking)) => booking,
        Ok(None) => return JsonResponse::not_found("Booking not found").into_response(),
        Err(e) => {
            error!("booking lookup failed: {e:?}");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    let authorized = match &user.role {
        UserRole::Customer => booking.customer_id == user.id,
        UserRole::FreelanceFixer | UserRole::EmployeeFixer { .. } => {
            match state.db.find_provider_by_user(user.id).await {
                Ok(Some(provider)) => booking.provider_id == provider.id,
                Ok(None) => false,
                Err(e) => {
                    error!("provider lookup failed: {e:?}");
                    return JsonResponse::server_error("Database error").into_response();
                }
            }
        }
        UserRole::Company => false,
    };
    if !authorized {
        return JsonResponse::forbidden("Not authorized").into_response();
    }

    if !booking.status.can_transition_to(payload.status) {
        return JsonResponse::conflict(&format!(
            "Cannot move booking from {} to {}",
            booking.status, payload.status
        ))
        .into_response();
    }

    match state
        .db
        .update_booking_status(booking.id, payload.status, Utc::now())
        .await
    {
        Ok(()) => JsonResponse::success("Booking status updated successfully").into_response(),
        Err(e) => {
            error!("booking status update failed: {e:?}");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::{Json, Path, State};
    use axum::http::StatusCode;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::Arc;

    use super::{
        handle_create_booking, handle_list_bookings, handle_update_status, BookingCreate,
        StatusUpdate,
    };
    use crate::db::memory::MemoryStore;
    use crate::db::repository::MarketRepository;
    use crate::models::booking::BookingStatus;
    use crate::models::category::ServiceCategory;
    use crate::routes::auth::session::AuthUser;
    use crate::state::AppState;
    use crate::test_support::{
        app_state, body_json, sample_customer, seed_employee, seed_freelancer, seed_user,
    };
    use uuid::Uuid;

    fn booking_payload(provider_id: Uuid, emergency: bool) -> BookingCreate {
        BookingCreate {
            provider_id,
            service_category: ServiceCategory::Electrical,
            description: "Fuse box keeps tripping".to_string(),
            scheduled_date: Utc::now(),
            location: json!({"address": "Hamra, Beirut", "lat": 33.9, "lng": 35.48}),
            emergency,
        }
    }

    async fn create_booking(
        state: &AppState,
        customer: &crate::models::user::User,
        provider_id: Uuid,
        emergency: bool,
    ) -> serde_json::Value {
        let response = handle_create_booking(
            State(state.clone()),
            AuthUser(customer.clone()),
            Json(booking_payload(provider_id, emergency)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    #[tokio::test]
    async fn standard_booking_is_priced_at_the_hourly_rate() {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_user(&store, sample_customer("c1")).await;
        let (_, provider) =
            seed_freelancer(&store, "p1", 30.0, 60.0, vec![ServiceCategory::Electrical]).await;
        let state = app_state(store);

        let booking = create_booking(&state, &customer, provider.id, false).await;
        assert_eq!(booking["price"], 30.0);
        assert_eq!(booking["status"], "pending");
    }

    #[tokio::test]
    async fn emergency_booking_is_priced_at_the_emergency_rate() {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_user(&store, sample_customer("c1")).await;
        let (_, provider) =
            seed_freelancer(&store, "p1", 30.0, 60.0, vec![ServiceCategory::Electrical]).await;
        let state = app_state(store);

        let booking = create_booking(&state, &customer, provider.id, true).await;
        assert_eq!(booking["price"], 60.0);
        assert_eq!(booking["emergency"], true);
    }

    #[tokio::test]
    async fn only_customers_can_book() {
        let store = Arc::new(MemoryStore::new());
        let (fixer, provider) =
            seed_freelancer(&store, "p1", 30.0, 60.0, vec![ServiceCategory::Electrical]).await;
        let state = app_state(store);

        let response = handle_create_booking(
            State(state),
            AuthUser(fixer),
            Json(booking_payload(provider.id, false)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn booking_an_unknown_provider_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_user(&store, sample_customer("c1")).await;
        let state = app_state(store);

        let response = handle_create_booking(
            State(state),
            AuthUser(customer),
            Json(booking_payload(Uuid::new_v4(), false)),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn a_customer_cannot_update_someone_elses_booking() {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_user(&store, sample_customer("c1")).await;
        let intruder = seed_user(&store, sample_customer("c2")).await;
        let (_, provider) =
            seed_freelancer(&store, "p1", 30.0, 60.0, vec![ServiceCategory::Electrical]).await;
        let state = app_state(store);

        let booking = create_booking(&state, &customer, provider.id, false).await;
        let booking_id = booking["id"].as_str().unwrap().parse().unwrap();

        let response = handle_update_status(
            State(state),
            AuthUser(intruder),
            Path(booking_id),
            Json(StatusUpdate {
                status: BookingStatus::Cancelled,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn a_provider_cannot_update_an_unassigned_booking() {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_user(&store, sample_customer("c1")).await;
        let (_, provider) =
            seed_freelancer(&store, "p1", 30.0, 60.0, vec![ServiceCategory::Electrical]).await;
        let (other_fixer, _) =
            seed_freelancer(&store, "p2", 25.0, 50.0, vec![ServiceCategory::Plumbing]).await;
        let state = app_state(store);

        let booking = create_booking(&state, &customer, provider.id, false).await;
        let booking_id = booking["id"].as_str().unwrap().parse().unwrap();

        let response = handle_update_status(
            State(state),
            AuthUser(other_fixer),
            Path(booking_id),
            Json(StatusUpdate {
                status: BookingStatus::Confirmed,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn company_owners_cannot_update_status() {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_user(&store, sample_customer("c1")).await;
        let (_employee, owner, provider) = seed_employee(&store, "e1", 35.0, 70.0).await;
        let state = app_state(store);

        let booking = create_booking(&state, &customer, provider.id, false).await;
        let booking_id = booking["id"].as_str().unwrap().parse().unwrap();

        let response = handle_update_status(
            State(state),
            AuthUser(owner),
            Path(booking_id),
            Json(StatusUpdate {
                status: BookingStatus::Confirmed,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn company_listing_spans_all_employee_providers() {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_user(&store, sample_customer("c1")).await;
        let (_, owner, first) = seed_employee(&store, "e1", 35.0, 70.0).await;
        let recruit = seed_user(&store, sample_customer("e2")).await;
        let company = store.find_company_by_owner(owner.id).await.unwrap().unwrap();
        let second = crate::models::provider::ServiceProvider::employee(
            recruit.id,
            company.id,
            20.0,
            40.0,
            vec![ServiceCategory::Plumbing],
        );
        store
            .add_employee(company.id, recruit.id, &second)
            .await
            .unwrap();
        let state = app_state(store);

        create_booking(&state, &customer, first.id, false).await;
        create_booking(&state, &customer, second.id, true).await;

        let response = handle_list_bookings(State(state), AuthUser(owner)).await;
        let body = body_json(response).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn confirmed_status_shows_up_in_the_customers_listing() {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_user(&store, sample_customer("c1")).await;
        let (fixer, provider) =
            seed_freelancer(&store, "p1", 30.0, 60.0, vec![ServiceCategory::Electrical]).await;
        let state = app_state(store);

        let booking = create_booking(&state, &customer, provider.id, false).await;
        assert_eq!(booking["price"], 30.0);
        assert_eq!(booking["status"], "pending");
        let booking_id = booking["id"].as_str().unwrap().parse().unwrap();

        let response = handle_update_status(
            State(state.clone()),
            AuthUser(fixer),
            Path(booking_id),
            Json(StatusUpdate {
                status: BookingStatus::Confirmed,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let listing = handle_list_bookings(State(state), AuthUser(customer)).await;
        let body = body_json(listing).await;
        let listed = body.as_array().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["status"], "confirmed");
        assert_eq!(listed[0]["provider_user"]["name"], "p1");
    }

    #[tokio::test]
    async fn backward_transitions_are_rejected() {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_user(&store, sample_customer("c1")).await;
        let (fixer, provider) =
            seed_freelancer(&store, "p1", 30.0, 60.0, vec![ServiceCategory::Electrical]).await;
        let state = app_state(store.clone());

        let booking = create_booking(&state, &customer, provider.id, false).await;
        let booking_id: Uuid = booking["id"].as_str().unwrap().parse().unwrap();

        for status in [
            BookingStatus::Confirmed,
            BookingStatus::InProgress,
            BookingStatus::Completed,
        ] {
            let response = handle_update_status(
                State(state.clone()),
                AuthUser(fixer.clone()),
                Path(booking_id),
                Json(StatusUpdate { status }),
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = handle_update_status(
            State(state.clone()),
            AuthUser(fixer),
            Path(booking_id),
            Json(StatusUpdate {
                status: BookingStatus::Pending,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let unchanged = store.find_booking_by_id(booking_id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, BookingStatus::Completed);
    }

    #[tokio::test]
    async fn updating_an_unknown_booking_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_user(&store, sample_customer("c1")).await;
        let state = app_state(store);

        let response = handle_update_status(
            State(state),
            AuthUser(customer),
            Path(Uuid::new_v4()),
            Json(StatusUpdate {
                status: BookingStatus::Cancelled,
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn fixer_listing_only_shows_their_own_bookings() {
        let store = Arc::new(MemoryStore::new());
        let customer = seed_user(&store, sample_customer("c1")).await;
        let (fixer, provider) =
            seed_freelancer(&store, "p1", 30.0, 60.0, vec![ServiceCategory::Electrical]).await;
        let (other_fixer, other_provider) =
            seed_freelancer(&store, "p2", 25.0, 50.0, vec![ServiceCategory::Plumbing]).await;
        let state = app_state(store);

        create_booking(&state, &customer, provider.id, false).await;
        create_booking(&state, &customer, other_provider.id, false).await;

        let mine = handle_list_bookings(State(state.clone()), AuthUser(fixer)).await;
        assert_eq!(body_json(mine).await.as_array().unwrap().len(), 1);
        let theirs = handle_list_bookings(State(state), AuthUser(other_fixer)).await;
        assert_eq!(body_json(theirs).await.as_array().unwrap().len(), 1);
    }
}
