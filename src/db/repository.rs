use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::models::booking::{Booking, BookingStatus};
use crate::models::category::ServiceCategory;
use crate::models::company::Company;
use crate::models::provider::ServiceProvider;
use crate::models::user::{User, UserRole};

/// Which slice of the booking ledger a caller is allowed to see.
#[derive(Debug, Clone, Copy)]
pub enum BookingScope {
    Customer(Uuid),
    Provider(Uuid),
    Company(Uuid),
}

#[derive(Debug, Clone)]
pub struct ProviderProfileUpdate {
    pub service_categories: Vec<ServiceCategory>,
    pub description: Option<String>,
    pub availability: Value,
    /// Ignored for employees; the route layer clears them before the call.
    pub hourly_rate: Option<f64>,
    pub emergency_rate: Option<f64>,
}

#[async_trait]
pub trait MarketRepository: Send + Sync {
    async fn find_user_by_session_token(&self, token: &str) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error>;
    async fn find_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, sqlx::Error>;
    async fn insert_user(&self, user: &User) -> Result<(), sqlx::Error>;
    async fn update_session_token(&self, user_id: Uuid, token: &str) -> Result<(), sqlx::Error>;
    async fn complete_profile(
        &self,
        user_id: Uuid,
        role: &UserRole,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<(), sqlx::Error>;

    async fn insert_company(&self, company: &Company) -> Result<(), sqlx::Error>;
    async fn find_company_by_id(&self, id: Uuid) -> Result<Option<Company>, sqlx::Error>;
    async fn find_company_by_owner(&self, owner_id: Uuid) -> Result<Option<Company>, sqlx::Error>;
    /// Promotes the user to employee fixer, creates their provider profile
    /// (unless one already exists) and adds them to the company's employee
    /// set, atomically where the backing store supports transactions.
    async fn add_employee(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        provider: &ServiceProvider,
    ) -> Result<(), sqlx::Error>;

    async fn insert_provider(&self, provider: &ServiceProvider) -> Result<(), sqlx::Error>;
    async fn find_provider_by_id(&self, id: Uuid) -> Result<Option<ServiceProvider>, sqlx::Error>;
    async fn find_provider_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ServiceProvider>, sqlx::Error>;
    async fn list_providers(
        &self,
        category: Option<ServiceCategory>,
    ) -> Result<Vec<ServiceProvider>, sqlx::Error>;
    async fn update_provider_profile(
        &self,
        user_id: Uuid,
        update: &ProviderProfileUpdate,
    ) -> Result<(), sqlx::Error>;

    async fn insert_booking(&self, booking: &Booking) -> Result<(), sqlx::Error>;
    async fn find_booking_by_id(&self, id: Uuid) -> Result<Option<Booking>, sqlx::Error>;
    async fn list_bookings(&self, scope: BookingScope) -> Result<Vec<Booking>, sqlx::Error>;
    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error>;
}
