//! Shared fixtures for the handler tests: an in-memory store wired into
//! `AppState`, a stubbed session verifier and a few seeded accounts.

use async_trait::async_trait;
use axum::response::Response;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::db::memory::MemoryStore;
use crate::db::repository::MarketRepository;
use crate::models::category::ServiceCategory;
use crate::models::company::Company;
use crate::models::provider::ServiceProvider;
use crate::models::user::{User, UserRole};
use crate::services::auth_client::{SessionData, SessionVerifier, SessionVerifyError};
use crate::state::AppState;

pub struct StubVerifier {
    session: Option<SessionData>,
    available: bool,
}

impl StubVerifier {
    pub fn ok(session: SessionData) -> Self {
        StubVerifier {
            session: Some(session),
            available: true,
        }
    }

    pub fn rejecting() -> Self {
        StubVerifier {
            session: None,
            available: true,
        }
    }

    pub fn down() -> Self {
        StubVerifier {
            session: None,
            available: false,
        }
    }
}

#[async_trait]
impl SessionVerifier for StubVerifier {
    async fn verify(&self, _session_id: &str) -> Result<SessionData, SessionVerifyError> {
        if !self.available {
            return Err(SessionVerifyError::Unavailable("stubbed outage".to_string()));
        }
        match &self.session {
            Some(data) => Ok(data.clone()),
            None => Err(SessionVerifyError::Rejected),
        }
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        port: 0,
        frontend_origin: "http://localhost:5173".to_string(),
        auth_login_url: "https://auth.test/".to_string(),
        auth_session_data_url: "https://auth.test/session-data".to_string(),
    }
}

pub fn app_state(store: Arc<MemoryStore>) -> AppState {
    app_state_with_auth(store, Arc::new(StubVerifier::rejecting()))
}

pub fn app_state_with_auth(store: Arc<MemoryStore>, auth: Arc<dyn SessionVerifier>) -> AppState {
    AppState {
        db: store,
        auth,
        config: Arc::new(test_config()),
    }
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn sample_customer(name: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: format!("{name}@example.com"),
        name: name.to_string(),
        role: UserRole::Customer,
        phone: None,
        picture: None,
        address: None,
        session_token: Some(format!("tok-{name}")),
        is_available: true,
        created_at: Utc::now(),
    }
}

pub async fn seed_user(store: &MemoryStore, user: User) -> User {
    store.insert_user(&user).await.unwrap();
    user
}

/// A freelance fixer with a provider profile at the given rates.
pub async fn seed_freelancer(
    store: &MemoryStore,
    name: &str,
    hourly_rate: f64,
    emergency_rate: f64,
    categories: Vec<ServiceCategory>,
) -> (User, ServiceProvider) {
    let mut user = sample_customer(name);
    user.role = UserRole::FreelanceFixer;
    let user = seed_user(store, user).await;

    let mut provider = ServiceProvider::freelance(user.id);
    provider.hourly_rate = Some(hourly_rate);
    provider.emergency_rate = Some(emergency_rate);
    provider.service_categories = categories;
    store.insert_provider(&provider).await.unwrap();
    (user, provider)
}

/// A company-role user with an owned (empty) company.
pub async fn seed_company_owner(store: &MemoryStore, name: &str) -> (User, Company) {
    let mut user = sample_customer(name);
    user.role = UserRole::Company;
    let user = seed_user(store, user).await;

    let company = Company::owned_by(&user, Some("+961 1 000000"), Some("Beirut"));
    store.insert_company(&company).await.unwrap();
    (user, company)
}

/// An employee fixer registered through their company: returns
/// (employee, owner, provider).
pub async fn seed_employee(
    store: &MemoryStore,
    name: &str,
    hourly_rate: f64,
    emergency_rate: f64,
) -> (User, User, ServiceProvider) {
    let (owner, company) = seed_company_owner(store, &format!("{name}-boss")).await;
    let employee = seed_user(store, sample_customer(name)).await;

    let provider = ServiceProvider::employee(
        employee.id,
        company.id,
        hourly_rate,
        emergency_rate,
        vec![ServiceCategory::Technical],
    );
    store
        .add_employee(company.id, employee.id, &provider)
        .await
        .unwrap();

    let employee = store
        .find_user_by_id(employee.id)
        .await
        .unwrap()
        .expect("employee should exist");
    (employee, owner, provider)
}
