// Error taxonomy for key loading, signing and the token exchange

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the crate can surface. There is no partial success: a token
/// exchange either yields a complete response or one of these.
#[derive(Debug, Error)]
pub enum Error {
    /// The private key file could not be read or parsed. Fatal.
    #[error("cannot load private key from {}: {source}", .path.display())]
    KeyLoad {
        path: PathBuf,
        #[source]
        source: KeyLoadReason,
    },

    /// The key cannot be used for RS256 signing. Configuration defect.
    #[error("cannot sign client assertion: {0}")]
    Signing(String),

    /// The token endpoint answered with a 4xx. `body` is the raw server reply.
    #[error("token endpoint rejected the assertion ({status}): {body}")]
    AuthRejected { status: u16, body: String },

    /// Connection refused, timeout, or the body could not be read.
    #[error("token endpoint transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// Any non-2xx, non-4xx status.
    #[error("token endpoint returned unexpected status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// A 2xx response whose body is not a token response.
    #[error("malformed token response: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum KeyLoadReason {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid PEM: {0}")]
    Pem(#[from] pem::PemError),

    #[error("expected a `PRIVATE KEY` (PKCS#8) block, found `{0}`")]
    UnexpectedLabel(String),

    #[error("not a PKCS#8 RSA private key: {0}")]
    Pkcs8(#[from] rsa::pkcs8::Error),

    #[error("cannot encode public key: {0}")]
    PublicKeyEncoding(#[from] rsa::pkcs8::spki::Error),
}

impl Error {
    pub(crate) fn key_load(path: impl Into<PathBuf>, source: impl Into<KeyLoadReason>) -> Self {
        Error::KeyLoad {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Whether a caller may reasonably try the same request again.
    ///
    /// Only transport failures and 5xx answers qualify; rejections and local
    /// key problems will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::UnexpectedStatus { status, .. } => (500..600).contains(status),
            _ => false,
        }
    }
}
