use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::repository::{BookingScope, MarketRepository, ProviderProfileUpdate};
use crate::models::booking::{Booking, BookingStatus};
use crate::models::category::ServiceCategory;
use crate::models::company::Company;
use crate::models::provider::ServiceProvider;
use crate::models::user::{User, UserRole};

/// Postgres-backed store. One table per collection, rows keyed by UUID;
/// enums and category arrays are stored as text and decoded on read.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPool::connect(database_url).await?;

        sqlx::query("SELECT 1").execute(&pool).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;

        info!("✅ Successfully connected to the database");
        Ok(PgStore { pool })
    }
}

fn decode_categories(raw: Vec<String>) -> Result<Vec<ServiceCategory>, sqlx::Error> {
    raw.iter()
        .map(|s| {
            s.parse()
                .map_err(|_| sqlx::Error::Decode(format!("unknown service category {s:?}").into()))
        })
        .collect()
}

fn encode_categories(categories: &[ServiceCategory]) -> Vec<String> {
    categories.iter().map(|c| c.as_str().to_string()).collect()
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    role: String,
    company_id: Option<Uuid>,
    phone: Option<String>,
    picture: Option<String>,
    address: Option<String>,
    session_token: Option<String>,
    is_available: bool,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<User, sqlx::Error> {
        let role = UserRole::from_parts(&self.role, self.company_id).ok_or_else(|| {
            sqlx::Error::Decode(
                format!("invalid role {:?} on user {}", self.role, self.id).into(),
            )
        })?;
        Ok(User {
            id: self.id,
            email: self.email,
            name: self.name,
            role,
            phone: self.phone,
            picture: self.picture,
            address: self.address,
            session_token: self.session_token,
            is_available: self.is_available,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CompanyRow {
    id: Uuid,
    name: String,
    owner_id: Uuid,
    email: String,
    phone: String,
    address: String,
    description: Option<String>,
    service_categories: Vec<String>,
    employees: Vec<Uuid>,
    created_at: DateTime<Utc>,
}

impl CompanyRow {
    fn into_company(self) -> Result<Company, sqlx::Error> {
        Ok(Company {
            id: self.id,
            name: self.name,
            owner_id: self.owner_id,
            email: self.email,
            phone: self.phone,
            address: self.address,
            description: self.description,
            service_categories: decode_categories(self.service_categories)?,
            employees: self.employees,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProviderRow {
    id: Uuid,
    user_id: Uuid,
    company_id: Option<Uuid>,
    service_categories: Vec<String>,
    hourly_rate: Option<f64>,
    emergency_rate: Option<f64>,
    description: Option<String>,
    rating: f64,
    total_jobs: i32,
    location: Option<Value>,
    availability: Value,
    created_at: DateTime<Utc>,
}

impl ProviderRow {
    fn into_provider(self) -> Result<ServiceProvider, sqlx::Error> {
        Ok(ServiceProvider {
            id: self.id,
            user_id: self.user_id,
            company_id: self.company_id,
            service_categories: decode_categories(self.service_categories)?,
            hourly_rate: self.hourly_rate,
            emergency_rate: self.emergency_rate,
            description: self.description,
            rating: self.rating,
            total_jobs: self.total_jobs,
            location: self.location,
            availability: self.availability,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    customer_id: Uuid,
    provider_id: Uuid,
    company_id: Option<Uuid>,
    service_category: String,
    description: String,
    scheduled_date: DateTime<Utc>,
    status: String,
    price: f64,
    location: Value,
    emergency: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, sqlx::Error> {
        let service_category = self.service_category.parse().map_err(|_| {
            sqlx::Error::Decode(
                format!("unknown service category {:?}", self.service_category).into(),
            )
        })?;
        let status = self.status.parse().map_err(|_| {
            sqlx::Error::Decode(format!("unknown booking status {:?}", self.status).into())
        })?;
        Ok(Booking {
            id: self.id,
            customer_id: self.customer_id,
            provider_id: self.provider_id,
            company_id: self.company_id,
            service_category,
            description: self.description,
            scheduled_date: self.scheduled_date,
            status,
            price: self.price,
            location: self.location,
            emergency: self.emergency,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

const USER_COLUMNS: &str = "id, email, name, role, company_id, phone, picture, address, session_token, is_available, created_at";
const COMPANY_COLUMNS: &str = "id, name, owner_id, email, phone, address, description, service_categories, employees, created_at";
const PROVIDER_COLUMNS: &str = "id, user_id, company_id, service_categories, hourly_rate, emergency_rate, description, rating, total_jobs, location, availability, created_at";
const BOOKING_COLUMNS: &str = "id, customer_id, provider_id, company_id, service_category, description, scheduled_date, status, price, location, emergency, created_at, updated_at";

#[async_trait]
impl MarketRepository for PgStore {
    async fn find_user_by_session_token(&self, token: &str) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE session_token = $1"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        row.map(UserRow::into_user).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(UserRow::into_user).transpose()
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(UserRow::into_user).transpose()
    }

    async fn find_users_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, sqlx::Error> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(UserRow::into_user).collect()
    }

    async fn insert_user(&self, user: &User) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO users (id, email, name, role, company_id, phone, picture, address, session_token, is_available, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.role.as_str())
        .bind(user.role.company_id())
        .bind(&user.phone)
        .bind(&user.picture)
        .bind(&user.address)
        .bind(&user.session_token)
        .bind(user.is_available)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_session_token(&self, user_id: Uuid, token: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET session_token = $2 WHERE id = $1")
            .bind(user_id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn complete_profile(
        &self,
        user_id: Uuid,
        role: &UserRole,
        phone: Option<&str>,
        address: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE users SET role = $2, company_id = $3, phone = $4, address = $5 WHERE id = $1",
        )
        .bind(user_id)
        .bind(role.as_str())
        .bind(role.company_id())
        .bind(phone)
        .bind(address)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_company(&self, company: &Company) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO companies (id, name, owner_id, email, phone, address, description, service_categories, employees, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(company.id)
        .bind(&company.name)
        .bind(company.owner_id)
        .bind(&company.email)
        .bind(&company.phone)
        .bind(&company.address)
        .bind(&company.description)
        .bind(encode_categories(&company.service_categories))
        .bind(&company.employees)
        .bind(company.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_company_by_id(&self, id: Uuid) -> Result<Option<Company>, sqlx::Error> {
        let row = sqlx::query_as::<_, CompanyRow>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(CompanyRow::into_company).transpose()
    }

    async fn find_company_by_owner(&self, owner_id: Uuid) -> Result<Option<Company>, sqlx::Error> {
        let row = sqlx::query_as::<_, CompanyRow>(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies WHERE owner_id = $1"
        ))
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(CompanyRow::into_company).transpose()
    }

    async fn add_employee(
        &self,
        company_id: Uuid,
        user_id: Uuid,
        provider: &ServiceProvider,
    ) -> Result<(), sqlx::Error> {
        // Three collections are touched; a transaction keeps a partial
        // failure from leaving the employee half-registered.
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE users SET role = 'employee_fixer', company_id = $2 WHERE id = $1")
            .bind(user_id)
            .bind(company_id)
            .execute(&mut *tx)
            .await?;

        let existing: Option<Uuid> =
            sqlx::query_scalar("SELECT id FROM service_providers WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        if existing.is_none() {
            sqlx::query(
                "INSERT INTO service_providers (id, user_id, company_id, service_categories, hourly_rate, emergency_rate, description, rating, total_jobs, location, availability, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            )
            .bind(provider.id)
            .bind(provider.user_id)
            .bind(provider.company_id)
            .bind(encode_categories(&provider.service_categories))
            .bind(provider.hourly_rate)
            .bind(provider.emergency_rate)
            .bind(&provider.description)
            .bind(provider.rating)
            .bind(provider.total_jobs)
            .bind(&provider.location)
            .bind(&provider.availability)
            .bind(provider.created_at)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            "UPDATE companies SET employees = array_append(employees, $2)
             WHERE id = $1 AND NOT ($2 = ANY(employees))",
        )
        .bind(company_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }

    async fn insert_provider(&self, provider: &ServiceProvider) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO service_providers (id, user_id, company_id, service_categories, hourly_rate, emergency_rate, description, rating, total_jobs, location, availability, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(provider.id)
        .bind(provider.user_id)
        .bind(provider.company_id)
        .bind(encode_categories(&provider.service_categories))
        .bind(provider.hourly_rate)
        .bind(provider.emergency_rate)
        .bind(&provider.description)
        .bind(provider.rating)
        .bind(provider.total_jobs)
        .bind(&provider.location)
        .bind(&provider.availability)
        .bind(provider.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_provider_by_id(&self, id: Uuid) -> Result<Option<ServiceProvider>, sqlx::Error> {
        let row = sqlx::query_as::<_, ProviderRow>(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM service_providers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(ProviderRow::into_provider).transpose()
    }

    async fn find_provider_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<ServiceProvider>, sqlx::Error> {
        let row = sqlx::query_as::<_, ProviderRow>(&format!(
            "SELECT {PROVIDER_COLUMNS} FROM service_providers WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(ProviderRow::into_provider).transpose()
    }

    async fn list_providers(
        &self,
        category: Option<ServiceCategory>,
    ) -> Result<Vec<ServiceProvider>, sqlx::Error> {
        let rows = match category {
            Some(category) => {
                sqlx::query_as::<_, ProviderRow>(&format!(
                    "SELECT {PROVIDER_COLUMNS} FROM service_providers WHERE $1 = ANY(service_categories)"
                ))
                .bind(category.as_str())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ProviderRow>(&format!(
                    "SELECT {PROVIDER_COLUMNS} FROM service_providers"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };
        rows.into_iter().map(ProviderRow::into_provider).collect()
    }

    async fn update_provider_profile(
        &self,
        user_id: Uuid,
        update: &ProviderProfileUpdate,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE service_providers
             SET service_categories = $2,
                 description = $3,
                 availability = $4,
                 hourly_rate = COALESCE($5, hourly_rate),
                 emergency_rate = COALESCE($6, emergency_rate)
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(encode_categories(&update.service_categories))
        .bind(&update.description)
        .bind(&update.availability)
        .bind(update.hourly_rate)
        .bind(update.emergency_rate)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_booking(&self, booking: &Booking) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO bookings (id, customer_id, provider_id, company_id, service_category, description, scheduled_date, status, price, location, emergency, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
        )
        .bind(booking.id)
        .bind(booking.customer_id)
        .bind(booking.provider_id)
        .bind(booking.company_id)
        .bind(booking.service_category.as_str())
        .bind(&booking.description)
        .bind(booking.scheduled_date)
        .bind(booking.status.as_str())
        .bind(booking.price)
        .bind(&booking.location)
        .bind(booking.emergency)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_booking_by_id(&self, id: Uuid) -> Result<Option<Booking>, sqlx::Error> {
        let row = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(BookingRow::into_booking).transpose()
    }

    async fn list_bookings(&self, scope: BookingScope) -> Result<Vec<Booking>, sqlx::Error> {
        let (filter, id) = match scope {
            BookingScope::Customer(id) => ("customer_id", id),
            BookingScope::Provider(id) => ("provider_id", id),
            BookingScope::Company(id) => ("company_id", id),
        };
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE {filter} = $1 ORDER BY created_at"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    async fn update_booking_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE bookings SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .bind(updated_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
