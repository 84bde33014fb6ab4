//! Error taxonomy for connectors and the orchestrator.
//!
//! Display strings are stable: UI layers match on them.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConnectError>;

#[derive(Debug, Error)]
pub enum ConnectError {
    /// No active connector, or the requested one is unknown or not installed.
    #[error("Connector not found")]
    ConnectorNotFound,

    #[error("Wallet not initialized")]
    NotInitialized,

    /// The provider global was absent when the connector was built.
    #[error("{0} not installed")]
    NotInstalled(&'static str),

    /// The secondary OKX endpoint cannot serve account and broadcast calls.
    #[error("Can't get accounts on testnet")]
    TestnetRestricted,

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Unsupported event: {0}")]
    UnsupportedEvent(String),

    /// Anything the injected wallet itself rejected with, verbatim.
    #[error("{0}")]
    Provider(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl ConnectError {
    pub fn provider(message: impl Into<String>) -> Self {
        ConnectError::Provider(message.into())
    }

    /// Precondition failures: the call never reached a provider.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            ConnectError::ConnectorNotFound | ConnectError::NotInitialized
        )
    }
}
