use std::sync::Arc;

use crate::config::Config;
use crate::db::repository::MarketRepository;
use crate::services::auth_client::SessionVerifier;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn MarketRepository>,
    pub auth: Arc<dyn SessionVerifier>,
    pub config: Arc<Config>,
}
