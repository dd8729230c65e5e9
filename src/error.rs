//! # Ledger VDR Errors
//!
//! Typed failures raised while talking to a ledger network. Lifecycle
//! operations never return these to their callers directly: they are folded
//! into [`crate::Outcome`] and [`crate::ResolveOutcome`] values.

use thiserror::Error;

/// Log an error and return it from the enclosing function.
///
/// # Example
/// ```
/// use ledger_vdr::{tracerr, Error, Result};
///
/// fn unsupported() -> Result<()> {
///     tracerr!(Error::Unsupported("update".into()))
/// }
///
/// assert!(unsupported().is_err());
/// ```
#[macro_export]
macro_rules! tracerr {
    ($err:expr) => {{
        let err = $err;
        tracing::error!("{err}");
        return Err(err.into());
    }};
}

/// Errors produced by ledger VDR components.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Required input is missing or empty. Always raised locally, before any
    /// network activity.
    #[error("{0}")]
    Validation(String),

    /// No network with the given name is configured.
    #[error("Network config not found for '{0}'")]
    NetworkNotFound(String),

    /// The registry holds no networks so there is no default to fall back on.
    #[error("no ledger networks configured")]
    ConfigurationEmpty,

    /// The identifier is not a DID of the form `did:<network>:<id>`.
    #[error("invalid DID: {0}")]
    InvalidDid(String),

    /// The request could not be completed: connection failure, timeout, or a
    /// response body that is not valid JSON.
    #[error("transport error: {0}")]
    Transport(String),

    /// The ledger answered with a non-2xx status.
    #[error("Ledger returned {status}: {body}")]
    LedgerRejected {
        /// HTTP status code.
        status: u16,
        /// Response body as returned by the ledger.
        body: String,
    },

    /// A document or ledger payload could not be decoded.
    #[error("malformed DID document: {0}")]
    MalformedDocument(String),

    /// The operation is intentionally not offered.
    #[error("{0} not supported")]
    Unsupported(String),

    /// The operation is declared but has no ledger implementation.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Configuration could not be loaded.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Short, stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "invalid_input",
            Self::NetworkNotFound(_) => "network_not_found",
            Self::ConfigurationEmpty => "configuration_empty",
            Self::InvalidDid(_) => "invalid_did",
            Self::Transport(_) => "request_error",
            Self::LedgerRejected { .. } => "ledger_rejected",
            Self::MalformedDocument(_) => "malformed_document",
            Self::Unsupported(_) => "not_supported",
            Self::NotImplemented(_) => "not_implemented",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }

    /// Transfer the error to `OAuth2` compatible format.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.code(),
            "error_description": self.to_string(),
        })
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::Transport(format!("invalid ledger URL: {err}"))
    }
}
