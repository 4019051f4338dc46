// Client credentials token request authenticated by a JWT assertion

use std::time::Duration;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::types::TokenResponse;

pub const GRANT_TYPE: &str = "client_credentials";
pub const JWT_BEARER_ASSERTION_TYPE: &str =
    "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// The four form fields of a JWT-bearer client credentials request.
pub fn token_request_form<'a>(
    client_id: &'a str,
    assertion: &'a str,
) -> [(&'static str, &'a str); 4] {
    [
        ("grant_type", GRANT_TYPE),
        ("client_id", client_id),
        ("client_assertion_type", JWT_BEARER_ASSERTION_TYPE),
        ("client_assertion", assertion),
    ]
}

/// Exchanges client assertions for access tokens at one token endpoint.
#[derive(Debug, Clone)]
pub struct TokenClient {
    http_client: reqwest::Client,
    token_endpoint: String,
    client_id: String,
}

impl TokenClient {
    /// Every request is bounded by `timeout`; exceeding it is a transport error.
    pub fn new(
        token_endpoint: impl Into<String>,
        client_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            token_endpoint: token_endpoint.into(),
            client_id: client_id.into(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::new(
            config.token_endpoint(),
            config.client_id.clone(),
            config.timeout,
        )
    }

    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }

    /// POST `assertion` as a client credentials grant.
    ///
    /// 4xx answers become [`Error::AuthRejected`] carrying the raw body.
    /// Nothing is retried here.
    pub async fn request_access_token(&self, assertion: &str) -> Result<TokenResponse> {
        let form = token_request_form(&self.client_id, assertion);
        debug!(
            url = %self.token_endpoint,
            grant_type = GRANT_TYPE,
            client_id = %self.client_id,
            client_assertion_type = JWT_BEARER_ASSERTION_TYPE,
            "Requesting access token"
        );

        let response = self
            .http_client
            .post(&self.token_endpoint)
            .form(&form[..])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        info!(status = %status, "Token endpoint answered");

        if status.is_success() {
            let token: TokenResponse = serde_json::from_str(&body)?;
            debug!(
                token_type = %token.token_type,
                expires_in = token.expires_in,
                "Access token received"
            );
            Ok(token)
        } else if status.is_client_error() {
            warn!(status = %status, body = %body, "Token endpoint rejected the assertion");
            Err(Error::AuthRejected {
                status: status.as_u16(),
                body,
            })
        } else {
            warn!(status = %status, body = %body, "Unexpected token endpoint status");
            Err(Error::UnexpectedStatus {
                status: status.as_u16(),
                body,
            })
        }
    }
}

impl TokenResponse {
    /// Payload of the access token when it is a JWT. Not verified.
    pub fn access_token_claims(&self) -> Option<serde_json::Value> {
        let payload = self.access_token.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_has_exactly_four_fields() {
        let form = token_request_form("test-client", "a.b.c");
        assert_eq!(form.len(), 4);
        assert_eq!(
            form,
            [
                ("grant_type", "client_credentials"),
                ("client_id", "test-client"),
                (
                    "client_assertion_type",
                    "urn:ietf:params:oauth:client-assertion-type:jwt-bearer"
                ),
                ("client_assertion", "a.b.c"),
            ]
        );
    }

    #[test]
    fn test_client_keeps_endpoint() {
        let client = TokenClient::new(
            "https://idp.test/auth/realms/demo/protocol/openid-connect/token",
            "test-client",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(
            client.token_endpoint(),
            "https://idp.test/auth/realms/demo/protocol/openid-connect/token"
        );
    }

    fn token(access_token: &str) -> TokenResponse {
        TokenResponse {
            access_token: access_token.to_string(),
            expires_in: 300,
            token_type: "bearer".to_string(),
            scope: None,
            refresh_token: None,
            refresh_expires_in: None,
            not_before_policy: None,
        }
    }

    #[test]
    fn test_access_token_claims_of_jwt() {
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"service-account","azp":"test-client"}"#);
        let claims = token(&format!("eyJhbGciOiJSUzI1NiJ9.{payload}.sig"))
            .access_token_claims()
            .expect("jwt payload");
        assert_eq!(claims["azp"], "test-client");
    }

    #[test]
    fn test_access_token_claims_of_opaque_token() {
        assert!(token("tok123").access_token_claims().is_none());
        assert!(token("not.base64!.sig").access_token_claims().is_none());
    }
}
