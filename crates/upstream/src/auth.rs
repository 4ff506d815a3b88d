//! Client for the authentication service.

use record::{Principal, VerifyTokenRequest};
use reqwest::StatusCode;
use tracing::debug;

use crate::config::endpoint;
use crate::error::{Service, UpstreamError};

const VERIFY_PATH: &str = "/auth/verifyToken";

/// Token from an `Authorization` header value using the `Bearer` scheme.
/// Any other scheme, or a blank token, yields `None`.
///
/// ```rust
/// use upstream::bearer_token;
///
/// assert_eq!(bearer_token("Bearer abc"), Some("abc"));
/// assert_eq!(bearer_token("abc"), None);
/// assert_eq!(bearer_token("Bearerabc"), None);
/// assert_eq!(bearer_token("Bearer   "), None);
/// ```
pub fn bearer_token(header: &str) -> Option<&str> {
    let rest = header.trim().strip_prefix("Bearer")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let token = rest.trim();
    (!token.is_empty()).then_some(token)
}

/// Verifies credentials against the authentication service.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Exchange a token for the principal it belongs to.
    ///
    /// Any status other than `200` comes back as [`UpstreamError::Status`]
    /// so the caller can hand the code to its own client verbatim.
    pub async fn verify(&self, token: &str) -> Result<Principal, UpstreamError> {
        let service = Service::Authentication;
        let response = self
            .http
            .post(endpoint(&self.base_url, VERIFY_PATH))
            .json(&VerifyTokenRequest {
                token: token.to_string(),
            })
            .send()
            .await
            .map_err(|e| UpstreamError::transport(service, e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(UpstreamError::Status {
                service,
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| UpstreamError::read_body(service, e))?;

        let principal: Principal =
            serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode {
                service,
                reason: e.to_string(),
            })?;
        debug!(username = %principal.username, role = principal.role.as_str(), "token_verified");
        Ok(principal)
    }
}
