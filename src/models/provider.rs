use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::category::ServiceCategory;

/// Fallback prices for providers that never set their rates.
pub const DEFAULT_HOURLY_RATE: f64 = 25.0;
pub const DEFAULT_EMERGENCY_RATE: f64 = 50.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceProvider {
    pub id: Uuid,
    pub user_id: Uuid,
    /// None for freelancers.
    pub company_id: Option<Uuid>,
    pub service_categories: Vec<ServiceCategory>,
    pub hourly_rate: Option<f64>,
    pub emergency_rate: Option<f64>,
    pub description: Option<String>,
    pub rating: f64,
    pub total_jobs: i32,
    pub location: Option<Value>,
    pub availability: Value,
    pub created_at: DateTime<Utc>,
}

impl ServiceProvider {
    /// Profile created when a user completes their profile as a freelance
    /// fixer. Rates start at the platform defaults and are self-editable.
    pub fn freelance(user_id: Uuid) -> Self {
        Self::with_rates(user_id, None, Vec::new(), DEFAULT_HOURLY_RATE, DEFAULT_EMERGENCY_RATE)
    }

    /// Profile created when a company adds an employee. Rates are set by
    /// the company and are not self-editable afterwards.
    pub fn employee(
        user_id: Uuid,
        company_id: Uuid,
        hourly_rate: f64,
        emergency_rate: f64,
        service_categories: Vec<ServiceCategory>,
    ) -> Self {
        Self::with_rates(
            user_id,
            Some(company_id),
            service_categories,
            hourly_rate,
            emergency_rate,
        )
    }

    fn with_rates(
        user_id: Uuid,
        company_id: Option<Uuid>,
        service_categories: Vec<ServiceCategory>,
        hourly_rate: f64,
        emergency_rate: f64,
    ) -> Self {
        ServiceProvider {
            id: Uuid::new_v4(),
            user_id,
            company_id,
            service_categories,
            hourly_rate: Some(hourly_rate),
            emergency_rate: Some(emergency_rate),
            description: None,
            rating: 0.0,
            total_jobs: 0,
            location: None,
            availability: Value::Object(Default::default()),
            created_at: Utc::now(),
        }
    }

    /// Price of a booking against this provider.
    pub fn quote(&self, emergency: bool) -> f64 {
        if emergency {
            self.emergency_rate.unwrap_or(DEFAULT_EMERGENCY_RATE)
        } else {
            self.hourly_rate.unwrap_or(DEFAULT_HOURLY_RATE)
        }
    }
}
