use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::category::ServiceCategory;
use crate::models::provider::ServiceProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Bookings only move forward: pending → confirmed → in_progress →
    /// completed, with cancellation possible from any non-terminal state.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Confirmed, InProgress)
                | (InProgress, Completed)
                | (Pending | Confirmed | InProgress, Cancelled)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "in_progress" => Ok(BookingStatus::InProgress),
            "completed" => Ok(BookingStatus::Completed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub company_id: Option<Uuid>,
    pub service_category: ServiceCategory,
    pub description: String,
    pub scheduled_date: DateTime<Utc>,
    pub status: BookingStatus,
    /// Fixed at creation from the provider's rate; never recomputed.
    pub price: f64,
    /// Opaque address/coordinates blob supplied by the customer.
    pub location: Value,
    pub emergency: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn create(
        customer_id: Uuid,
        provider: &ServiceProvider,
        service_category: ServiceCategory,
        description: String,
        scheduled_date: DateTime<Utc>,
        location: Value,
        emergency: bool,
    ) -> Self {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            customer_id,
            provider_id: provider.id,
            company_id: provider.company_id,
            service_category,
            description,
            scheduled_date,
            status: BookingStatus::Pending,
            price: provider.quote(emergency),
            location,
            emergency,
            created_at: now,
            updated_at: now,
        }
    }
}
