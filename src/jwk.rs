// Public key publication as a JSON Web Key

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rsa::traits::PublicKeyParts;

use crate::types::{JsonWebKey, JwksResponse, KeyPair};

/// Describe the public half of `key_pair` as an RS256 signing JWK.
pub fn publish_jwk(key_pair: &KeyPair) -> JsonWebKey {
    let public_key = key_pair.public_key();

    let n_b64 = URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be());
    let e_b64 = URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be());

    JsonWebKey {
        kty: "RSA".to_string(),
        kid: key_pair.key_id(),
        key_use: "sig".to_string(),
        alg: "RS256".to_string(),
        n: n_b64,
        e: e_b64,
    }
}

/// Single key set wrapping [`publish_jwk`].
pub fn publish_jwks(key_pair: &KeyPair) -> JwksResponse {
    JwksResponse {
        keys: vec![publish_jwk(key_pair)],
    }
}
