// Key identifier derivation shared by the signer and the JWKS endpoint

use sha1::{Digest, Sha1};

/// Lowercase hex SHA-1 of `bytes`, 40 characters long.
///
/// The client puts this in the assertion header and the server in the
/// published JWK, so both must feed it the same key encoding.
pub fn compute_thumbprint(bytes: &[u8]) -> String {
    hex::encode(Sha1::digest(bytes))
}
