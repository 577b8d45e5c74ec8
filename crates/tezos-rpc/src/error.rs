use chain_tezos::TezosError;
use thiserror::Error;

/// Errors raised by the node client and the operation pipeline.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("configuration source error: {0}")]
    Config(#[from] config::ConfigError),

    /// Non-2xx reply with a body. Displays as the body verbatim so node
    /// diagnostics reach the caller unchanged.
    #[error("{body}")]
    Node { status: u16, body: String },

    /// Non-2xx reply with an empty body.
    #[error("node returned HTTP {0}")]
    Status(u16),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no result handler for operation kind {0:?}")]
    UnsupportedOperationKind(String),

    #[error("malformed node response: {0}")]
    MalformedResponse(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error(transparent)]
    Tezos(#[from] TezosError),
}

impl RpcError {
    pub fn malformed<S: Into<String>>(msg: S) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Map a failed HTTP reply to an error, preferring the body as message.
    pub fn from_status(status: u16, body: String) -> Self {
        if body.trim().is_empty() {
            Self::Status(status)
        } else {
            Self::Node { status, body }
        }
    }
}
