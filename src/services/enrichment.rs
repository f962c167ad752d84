//! Read-time joins attaching related user/company documents to primary
//! records for client display. No caching; each lookup reads whatever
//! exists at that moment.

use serde::Serialize;

use crate::db::repository::MarketRepository;
use crate::models::booking::Booking;
use crate::models::company::Company;
use crate::models::provider::ServiceProvider;
use crate::models::user::User;

#[derive(Debug, Serialize)]
pub struct EnrichedProvider {
    #[serde(flatten)]
    pub provider: ServiceProvider,
    pub user: Option<User>,
    pub company: Option<Company>,
}

pub async fn enrich_provider(
    db: &dyn MarketRepository,
    provider: ServiceProvider,
) -> Result<EnrichedProvider, sqlx::Error> {
    let user = db.find_user_by_id(provider.user_id).await?;
    let company = match provider.company_id {
        Some(id) => db.find_company_by_id(id).await?,
        None => None,
    };
    Ok(EnrichedProvider {
        provider,
        user,
        company,
    })
}

#[derive(Debug, Serialize)]
pub struct EnrichedBooking {
    #[serde(flatten)]
    pub booking: Booking,
    pub customer: Option<User>,
    pub provider: Option<ServiceProvider>,
    pub provider_user: Option<User>,
}

pub async fn enrich_booking(
    db: &dyn MarketRepository,
    booking: Booking,
) -> Result<EnrichedBooking, sqlx::Error> {
    let customer = db.find_user_by_id(booking.customer_id).await?;
    let provider = db.find_provider_by_id(booking.provider_id).await?;
    let provider_user = match &provider {
        Some(p) => db.find_user_by_id(p.user_id).await?,
        None => None,
    };
    Ok(EnrichedBooking {
        booking,
        customer,
        provider,
        provider_user,
    })
}
