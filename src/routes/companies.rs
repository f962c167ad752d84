use axum::{
    extract::{Json, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::models::category::ServiceCategory;
use crate::models::provider::ServiceProvider;
use crate::models::user::UserRole;
use crate::responses::JsonResponse;
use crate::routes::auth::session::AuthUser;
use crate::state::AppState;

/// Company dashboard lookup: the owner's company with the employee id set
/// expanded to full user records.
pub async fn handle_my_company(State(state): State<AppState>, AuthUser(user): AuthUser) -> Response {
    if user.role != UserRole::Company {
        return JsonResponse::forbidden("Not authorized").into_response();
    }

    let company = match state.db.find_company_by_owner(user.id).await {
        Ok(Some(company)) => company,
        Ok(None) => return JsonResponse::not_found("Company not found").into_response(),
        Err(e) => {
            error!("company lookup failed: {e:?}");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    let employees = match state.db.find_users_by_ids(&company.employees).await {
        Ok(employees) => employees,
        Err(e) => {
            error!("employee lookup failed: {e:?}");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    let mut body = json!(company);
    body["employees"] = json!(employees);
    Json(body).into_response()
}

#[derive(Deserialize)]
pub struct AddEmployeePayload {
    pub employee_email: String,
    pub hourly_rate: f64,
    pub emergency_rate: f64,
    pub service_categories: Vec<ServiceCategory>,
}

/// Promotes an existing user to employee fixer of the owner's company,
/// with rates fixed by the company. Re-adding someone is a no-op.
pub async fn handle_add_employee(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(payload): Json<AddEmployeePayload>,
) -> Response {
    if user.role != UserRole::Company {
        return JsonResponse::forbidden("Not authorized").into_response();
    }

    let company = match state.db.find_company_by_owner(user.id).await {
        Ok(Some(company)) => company,
        Ok(None) => return JsonResponse::not_found("Company not found").into_response(),
        Err(e) => {
            error!("company lookup failed: {e:?}");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    let employee = match state.db.find_user_by_email(&payload.employee_email).await {
        Ok(Some(employee)) => employee,
        Ok(None) => return JsonResponse::not_found("Employee not found").into_response(),
        Err(e) => {
            error!("employee lookup failed: {e:?}");
            return JsonResponse::server_error("Database error").into_response();
        }
    };

    let provider = ServiceProvider::employee(
        employee.id,
        company.id,
        payload.hourly_rate,
        payload.emergency_rate,
        payload.service_categories,
    );

    match state.db.add_employee(company.id, employee.id, &provider).await {
        Ok(()) => JsonResponse::success("Employee added successfully").into_response(),
        Err(e) => {
            error!("employee registration failed: {e:?}");
            JsonResponse::server_error("Database error").into_response()
        }
    }
}
