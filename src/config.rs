use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub frontend_origin: String,
    /// Login page of the external auth provider; users are sent here with
    /// a redirect back to the frontend callback.
    pub auth_login_url: String,
    /// Endpoint exchanging a session id for session data.
    pub auth_session_data_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            frontend_origin: env::var("FRONTEND_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            auth_login_url: env::var("AUTH_LOGIN_URL")
                .unwrap_or_else(|_| "https://auth.emergentagent.com/".to_string()),
            auth_session_data_url: env::var("AUTH_SESSION_DATA_URL").unwrap_or_else(|_| {
                "https://demobackend.emergentagent.com/auth/v1/env/oauth/session-data".to_string()
            }),
        }
    }
}
