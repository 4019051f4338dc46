// JWKS endpoint implementation

use axum::{extract::State, response::Json};
use std::sync::Arc;
use tracing::debug;

use crate::jwk::publish_jwks;
use crate::types::{JwksResponse, KeyPair};

/// Application state: the key whose public half is published
pub type AppState = Arc<KeyPair>;

/// JWKS endpoint handler - serves the public key in JWKS format
///
/// The JWK is derived again on every request; the result is identical each time.
pub async fn jwks_handler(State(key_pair): State<AppState>) -> Json<JwksResponse> {
    let jwks = publish_jwks(&key_pair);
    debug!(kid = %key_pair.key_id(), "Serving JWKS");
    Json(jwks)
}
