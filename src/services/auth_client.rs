use async_trait::async_trait;
use serde::Deserialize;

/// Payload the upstream provider returns for a verified session id.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionData {
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    pub session_token: String,
}

#[derive(Debug)]
pub enum SessionVerifyError {
    /// The provider answered and rejected the session id.
    Rejected,
    /// The provider was unreachable or returned a malformed payload.
    Unavailable(String),
}

#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, session_id: &str) -> Result<SessionData, SessionVerifyError>;
}

/// HTTP client for the external auth provider. Token issuance lives
/// entirely upstream; we only exchange a session id for session data.
pub struct EmergentAuthClient {
    client: reqwest::Client,
    session_data_url: String,
}

impl EmergentAuthClient {
    pub fn new(session_data_url: String) -> Self {
        EmergentAuthClient {
            client: reqwest::Client::new(),
            session_data_url,
        }
    }
}

#[async_trait]
impl SessionVerifier for EmergentAuthClient {
    async fn verify(&self, session_id: &str) -> Result<SessionData, SessionVerifyError> {
        let response = self
            .client
            .get(&self.session_data_url)
            .header("X-Session-ID", session_id)
            .send()
            .await
            .map_err(|e| SessionVerifyError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SessionVerifyError::Rejected);
        }

        response
            .json::<SessionData>()
            .await
            .map_err(|e| SessionVerifyError::Unavailable(e.to_string()))
    }
}
