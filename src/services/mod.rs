pub mod auth_client;
pub mod enrichment;
