// JWT-bearer client assertions (RFC 7523) and JWKS publication (RFC 7517)

pub mod assertion;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod jwk;
pub mod key_management;
pub mod server;
pub mod thumbprint;
pub mod token_client;
pub mod types;

pub use assertion::build_assertion;
pub use error::{Error, KeyLoadReason, Result};
pub use jwk::{publish_jwk, publish_jwks};
pub use key_management::load_private_key;
pub use thumbprint::compute_thumbprint;
pub use token_client::TokenClient;
pub use types::{JsonWebKey, JwksResponse, KeyPair, TokenResponse};
