use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use uuid::Uuid;

use super::repository::{BookingScope, MarketRepository, ProviderProfileUpdate};
use crate::models::booking::{Booking, BookingStatus};
use crate::models::category::ServiceCategory;
use crate::models::company::Company;
use crate::models::provider::ServiceProvider;
use crate::models::user::{User, UserRole};

/// In-memory stand-in for [`PgStore`](super::pg_store::PgStore), used by the
/// handler tests. Same observable behaviour, no database.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    companies: Vec<Company>,
    providers: Vec<ServiceProvider>,
    bookings: Vec<Booking>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn companies_owned_by(&self, owner_id: Uuid) -> usize {
        self.inner
            .lock()
            .unwrap()
            .companies
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .count()
    }

    pub fn providers_for(&self, user_id: Uuid) -> usize {
        self.inner
            .lock()
            .unwrap()
            .providers
            .iter()
            .filter(|p| p.user_id == user_id)
            .count()
    }
}

#[async_trait]
impl MarketRepository for MemoryStore {
    async fn find_user_by_session_token(&self, token: &str) -> Result<Option<User>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .find(|u| u.session_token.as_deref() == Some(token))
            .cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn insert_user(&self, user: &User) -> Result<(), sqlx::Error> {
        self.inner.lock().unwrap().users.push(user.clone());
        Ok(())
    }

    async fn update_session_token(&self, user_id: Uuid, token: &str) -> Result<(), sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == user_id) {
            user.session_token = Some(token.to_string());
        }
        Ok(())
    }

    async fn complete_profile(
        &self,
        user_id: Uuid,
        role: &UserRole,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == user_id) {
            user.role = role.clone();
            user.phone = phone.map(str::to_string);
            user.address = address.map(str::to_string);
        }
        Ok(())
    }

    async fn insert_company(&self, company: &Company) -> Result<(), sqlx::Error> {
        self.inner.lock().unwrap().companies.push(company.clone());
        Ok(())
    }

    async fn find_company_by_id(&self, id: Uuid) -> Result<Option<Company>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.companies.iter().find(|c| c.id == id).cloned())
    }

    async fn find_company_by_owner(&self, owner_id: Uuid) -> Result<Option<Company>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.companies.iter().find(|c| c.owner_id == owner_id).cloned())
    }

    async fn add_employee(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        provider: &ServiceProvider,
    ) -> Result<(), sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.iter_mut().find(|u| u.id == user_id) {
            user.role = UserRole::EmployeeFixer { company_id };
        }
        if !inner.providers.iter().any(|p| p.user_id == user_id) {
            inner.providers.push(provider.clone());
        }
        if let Some(company) = inner.companies.iter_mut().find(|c| c.id == company_id) {
            if !company.employees.contains(&user_id) {
                company.employees.push(user_id);
            }
        }
        Ok(())
    }

    async fn insert_provider(&self, provider: &ServiceProvider) -> Result<(), sqlx::Error> {
        self.inner.lock().unwrap().providers.push(provider.clone());
        Ok(())
    }

    async fn find_provider_by_id(&self, id: Uuid) -> Result<Option<ServiceProvider>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.providers.iter().find(|p| p.id == id).cloned())
    }

    async fn find_provider_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ServiceProvider>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.providers.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn list_providers(
        &self,
        category: Option<ServiceCategory>,
    ) -> Result<Vec<ServiceProvider>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .providers
            .iter()
            .filter(|p| category.map_or(true, |c| p.service_categories.contains(&c)))
            .cloned()
            .collect())
    }

    async fn update_provider_profile(
        &self,
        user_id: Uuid,
        update: &ProviderProfileUpdate,
    ) -> Result<(), sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(provider) = inner.providers.iter_mut().find(|p| p.user_id == user_id) {
            provider.service_categories = update.service_categories.clone();
            provider.description = update.description.clone();
            provider.availability = update.availability.clone();
            if let Some(rate) = update.hourly_rate {
                provider.hourly_rate = Some(rate);
            }
            if let Some(rate) = update.emergency_rate {
                provider.emergency_rate = Some(rate);
            }
        }
        Ok(())
    }

    async fn insert_booking(&self, booking: &Booking) -> Result<(), sqlx::Error> {
        self.inner.lock().unwrap().bookings.push(booking.clone());
        Ok(())
    }

    async fn find_booking_by_id(&self, id: Uuid) -> Result<Option<Booking>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn list_bookings(&self, scope: BookingScope) -> Result<Vec<Booking>, sqlx::Error> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .bookings
            .iter()
            .filter(|b| match scope {
                BookingScope::Customer(id) => b.customer_id == id,
                BookingScope::Provider(id) => b.provider_id == id,
                BookingScope::Company(id) => b.company_id == Some(id),
            })
            .cloned()
            .collect())
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(booking) = inner.bookings.iter_mut().find(|b| b.id == id) {
            booking.status = status;
            booking.updated_at = updated_at;
        }
        Ok(())
    }
}
