use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::category::ServiceCategory;
use crate::models::user::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Company {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub description: Option<String>,
    pub service_categories: Vec<ServiceCategory>,
    /// User ids of the company's employee fixers. Treated as a set.
    pub employees: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Company {
    /// Company shell created when a user completes their profile with the
    /// company role. Contact fields are copied from the owner.
    pub fn owned_by(owner: &User, phone: Option<&str>, address: Option<&str>) -> Self {
        Company {
            id: Uuid::new_v4(),
            name: format!("{}'s Company", owner.name),
            owner_id: owner.id,
            email: owner.email.clone(),
            phone: phone.unwrap_or_default().to_string(),
            address: address.unwrap_or_default().to_string(),
            description: None,
            service_categories: Vec::new(),
            employees: Vec::new(),
            created_at: Utc::now(),
        }
    }
}
