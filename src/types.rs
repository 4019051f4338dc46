// Data structures shared by the client and the JWKS server

use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};

/// RSA private key together with its derived public half.
///
/// Built only by [`KeyPair::from_pkcs8_pem`](crate::key_management) so the
/// public key encoding is always present and valid.
#[derive(Clone)]
pub struct KeyPair {
    pub(crate) private_key: RsaPrivateKey,
    pub(crate) public_key: RsaPublicKey,
    /// DER SubjectPublicKeyInfo of `public_key`; input to the thumbprint.
    pub(crate) public_key_der: Vec<u8>,
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("kid", &self.key_id())
            .finish_non_exhaustive()
    }
}

/// JSON Web Key structure for JWKS response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    pub kty: String, // Key type (RSA)
    pub kid: String, // Key ID
    #[serde(rename = "use")]
    pub key_use: String, // Key usage (sig for signature)
    pub alg: String, // Algorithm (RS256)
    pub n: String,   // Modulus (base64url)
    pub e: String,   // Exponent (base64url)
}

/// JWKS response format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwksResponse {
    pub keys: Vec<JsonWebKey>,
}

/// JOSE header of a client assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionHeader {
    pub alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kid: Option<String>,
}

/// Claims of a client assertion (RFC 7523 section 3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub jti: String, // Unique per assertion
    pub iss: String, // Client ID
    pub sub: String, // Client ID
    pub aud: String, // Token endpoint URL
    pub iat: i64,    // Issued at
    pub exp: i64,    // Expires at
}

/// Successful answer of the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_expires_in: Option<u64>,
    #[serde(
        rename = "not-before-policy",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub not_before_policy: Option<i64>,
}
