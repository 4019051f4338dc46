// JWT client assertion construction and RS256 signing (RFC 7523)

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey};
use rsa::pkcs8::EncodePrivateKey;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{AssertionClaims, AssertionHeader, KeyPair};

/// Lifetime of every assertion, in seconds.
pub const ASSERTION_TTL_SECS: i64 = 300;

impl AssertionHeader {
    /// RS256 header, optionally naming the signing key.
    pub fn rs256(kid: Option<String>) -> Self {
        AssertionHeader {
            alg: "RS256".to_string(),
            kid,
        }
    }
}

impl AssertionClaims {
    /// Self-issued claims for `client_id`, valid from `issued_at` for
    /// [`ASSERTION_TTL_SECS`].
    pub fn new(client_id: &str, audience: &str, issued_at: i64) -> Self {
        AssertionClaims {
            jti: Uuid::new_v4().to_string(),
            iss: client_id.to_string(),
            sub: client_id.to_string(),
            aud: audience.to_string(),
            iat: issued_at,
            exp: issued_at + ASSERTION_TTL_SECS,
        }
    }
}

/// Build and sign a fresh client assertion.
///
/// `audience` must be the token endpoint URL exactly as the server expects
/// it. Set `include_key_id` when the client serves its own JWKS, so the
/// server can pick the key by `kid`; leave it off when the public key was
/// registered with the server out of band.
pub fn build_assertion(
    key_pair: &KeyPair,
    client_id: &str,
    audience: &str,
    include_key_id: bool,
) -> Result<String> {
    let kid = include_key_id.then(|| key_pair.key_id());
    let header = AssertionHeader::rs256(kid);
    let claims = AssertionClaims::new(client_id, audience, Utc::now().timestamp());

    debug!(
        jti = %claims.jti,
        iss = %claims.iss,
        aud = %claims.aud,
        exp = claims.exp,
        kid = ?header.kid,
        "Built client assertion"
    );

    sign_assertion(&header, &claims, key_pair)
}

/// Serialize `header` and `claims` and sign them with RS256 into a compact JWS.
pub fn sign_assertion(
    header: &AssertionHeader,
    claims: &AssertionClaims,
    key_pair: &KeyPair,
) -> Result<String> {
    let signing_input = format!("{}.{}", encode_segment(header)?, encode_segment(claims)?);

    let private_key_pem = key_pair
        .private_key
        .to_pkcs8_pem(rsa::pkcs8::LineEnding::LF)
        .map_err(|e| Error::Signing(format!("cannot encode private key: {e}")))?;
    let encoding_key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
        .map_err(|e| Error::Signing(format!("unusable RSA key: {e}")))?;

    let signature = jsonwebtoken::crypto::sign(
        signing_input.as_bytes(),
        &encoding_key,
        Algorithm::RS256,
    )
    .map_err(|e| Error::Signing(e.to_string()))?;

    Ok(format!("{signing_input}.{signature}"))
}

fn encode_segment<T: Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_vec(value).map_err(|e| Error::Signing(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}
