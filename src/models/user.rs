use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::auth_client::SessionData;

/// Account role, tagged so role-specific fields cannot leak onto the wrong
/// kind of account: only an employee fixer carries a company_id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum UserRole {
    Customer,
    FreelanceFixer,
    EmployeeFixer { company_id: Uuid },
    Company,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Customer => "customer",
            UserRole::FreelanceFixer => "freelance_fixer",
            UserRole::EmployeeFixer { .. } => "employee_fixer",
            UserRole::Company => "company",
        }
    }

    pub fn is_fixer(&self) -> bool {
        matches!(
            self,
            UserRole::FreelanceFixer | UserRole::EmployeeFixer { .. }
        )
    }

    pub fn company_id(&self) -> Option<Uuid> {
        match self {
            UserRole::EmployeeFixer { company_id } => Some(*company_id),
            _ => None,
        }
    }

    /// Rebuild the tagged role from its stored parts. An employee row
    /// without a company_id is invalid and yields None.
    pub fn from_parts(role: &str, company_id: Option<Uuid>) -> Option<UserRole> {
        match role {
            "customer" => Some(UserRole::Customer),
            "freelance_fixer" => Some(UserRole::FreelanceFixer),
            "employee_fixer" => company_id.map(|company_id| UserRole::EmployeeFixer { company_id }),
            "company" => Some(UserRole::Company),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(flatten)]
    pub role: UserRole,
    pub phone: Option<String>,
    pub picture: Option<String>,
    pub address: Option<String>,
    #[serde(skip_serializing, default)]
    pub session_token: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Account bootstrapped from a verified upstream session. Everyone
    /// starts out as a customer until they complete their profile.
    pub fn from_session(data: &SessionData) -> Self {
        User {
            id: Uuid::new_v4(),
            email: data.email.clone(),
            name: data.name.clone(),
            role: UserRole::Customer,
            phone: None,
            picture: data.picture.clone(),
            address: None,
            session_token: Some(data.session_token.clone()),
            is_available: true,
            created_at: Utc::now(),
        }
    }
}
