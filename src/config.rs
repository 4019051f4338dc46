// Command line and configuration values for both sides

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

pub const DEFAULT_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_BIND: &str = "0.0.0.0:8085";

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "jwks-bearer")]
#[command(about = "JWT-bearer client assertions and a JWKS endpoint for the matching key")]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true, env = "JWKS_BEARER_VERBOSE")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the public key at /.well-known/jwks.json
    Serve(ServeArgs),
    /// Sign a client assertion and exchange it for an access token
    RequestToken(RequestTokenArgs),
}

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Private PEM key file (PKCS#8)
    #[arg(long, env = "JWKS_KEY_PATH")]
    pub key_path: PathBuf,

    /// Listen address
    #[arg(long, default_value = DEFAULT_BIND, env = "JWKS_BIND")]
    pub bind: SocketAddr,
}

#[derive(clap::Args, Debug)]
pub struct RequestTokenArgs {
    /// Authentication server host, e.g. https://auth.example.com
    #[arg(long, env = "AUTH_HOST")]
    pub auth_host: String,

    /// Realm holding the client
    #[arg(long, env = "AUTH_REALM")]
    pub realm: String,

    /// Client ID registered with the authentication server
    #[arg(long, env = "AUTH_CLIENT_ID")]
    pub client_id: String,

    /// Private PEM key file (PKCS#8)
    #[arg(long, env = "JWKS_KEY_PATH")]
    pub key_path: PathBuf,

    /// The public key was handed to the server instead of served; omit `kid`
    #[arg(long)]
    pub no_self_hosted: bool,

    /// Token request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter(verbose: bool) -> String {
    let level = if verbose { "debug" } else { "info" };
    format!("{}={level},tower_http={level}", env!("CARGO_CRATE_NAME"))
}

/// Everything the client side needs to obtain a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub auth_host: String,
    pub realm: String,
    pub client_id: String,
    pub key_path: PathBuf,
    /// Whether this client serves its own JWKS. Controls `kid` in assertions.
    pub serve_public_key: bool,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Realm scoped token endpoint. Also the assertion audience.
    pub fn token_endpoint(&self) -> String {
        format!(
            "{}/auth/realms/{}/protocol/openid-connect/token",
            self.auth_host.trim_end_matches('/'),
            self.realm
        )
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if !self.auth_host.starts_with("https://") && !self.auth_host.starts_with("http://") {
            return Err("auth host must be a valid HTTP(S) URL".to_string());
        }

        if self.realm.is_empty() {
            return Err("realm is required".to_string());
        }

        if self.client_id.is_empty() {
            return Err("client id is required".to_string());
        }

        if self.key_path.as_os_str().is_empty() {
            return Err("key path is required".to_string());
        }

        if self.timeout.is_zero() {
            return Err("timeout must be positive".to_string());
        }

        Ok(())
    }
}

impl From<RequestTokenArgs> for ClientConfig {
    fn from(args: RequestTokenArgs) -> Self {
        Self {
            auth_host: args.auth_host,
            realm: args.realm,
            client_id: args.client_id,
            key_path: args.key_path,
            serve_public_key: !args.no_self_hosted,
            timeout: Duration::from_secs(args.timeout_secs),
        }
    }
}

/// JWKS server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub key_path: PathBuf,
    pub bind: SocketAddr,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        Self {
            key_path: args.key_path,
            bind: args.bind,
        }
    }
}
