// JWT-bearer demo client and JWKS server
//
// `serve` publishes the public half of a private key as a JWKS so an
// authentication server can verify client assertions signed with it.
// `request-token` signs such an assertion and trades it for an access token.

use std::io::ErrorKind;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, error, info};

use jwks_bearer::config::{Cli, ClientConfig, Command, default_log_filter};
use jwks_bearer::{
    Error, KeyLoadReason, TokenClient, TokenResponse, build_assertion, load_private_key, server,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_log_filter(cli.verbose).into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Command::Serve(args) => server::start_server(args.into()).await,
        Command::RequestToken(args) => request_token(args.into()).await,
    }
}

async fn request_token(config: ClientConfig) -> Result<()> {
    if let Err(e) = config.validate() {
        bail!("Invalid configuration: {e}");
    }

    info!(
        auth_host = %config.auth_host,
        realm = %config.realm,
        client_id = %config.client_id,
        "Requesting access token"
    );

    let key_pair = load_private_key(&config.key_path).map_err(with_key_hint)?;
    let client = TokenClient::from_config(&config)?;
    let assertion = build_assertion(
        &key_pair,
        &config.client_id,
        client.token_endpoint(),
        config.serve_public_key,
    )?;
    debug!(client_assertion = %assertion, "Signed client assertion");

    match client.request_access_token(&assertion).await {
        Ok(token) => {
            println!("{}", render_token(&token)?);
            Ok(())
        }
        Err(Error::AuthRejected { status, body }) => {
            error!(status, "Failed to get access token");
            eprintln!("{}", render_rejection(&body));
            bail!("Token endpoint rejected the client assertion ({status})")
        }
        Err(e) => {
            let retryable = e.is_retryable();
            Err(e).with_context(|| format!("Failed to get access token (retryable: {retryable})"))
        }
    }
}

/// Suggest how to create the key when the file does not exist.
fn with_key_hint(err: Error) -> anyhow::Error {
    let hint = match &err {
        Error::KeyLoad {
            path,
            source: KeyLoadReason::Io(io),
        } if io.kind() == ErrorKind::NotFound => Some(format!(
            "Private PEM key not found in {0}. Generate one with \
             `openssl genpkey -algorithm RSA -pkeyopt rsa_keygen_bits:2048 -out {0}`",
            path.display()
        )),
        _ => None,
    };

    match hint {
        Some(hint) => anyhow::Error::new(err).context(hint),
        None => err.into(),
    }
}

/// Pretty JSON of the token response, with the decoded access token payload
/// under `access_token_content` when the token is a JWT.
fn render_token(token: &TokenResponse) -> Result<String> {
    let mut output = serde_json::to_value(token)?;
    if let Some(claims) = token.access_token_claims() {
        output["access_token_content"] = claims;
    }
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Pretty JSON of a rejection body, or the body as is when it is not JSON.
fn render_rejection(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| serde_json::to_string_pretty(&json).ok())
        .unwrap_or_else(|| body.to_string())
}
