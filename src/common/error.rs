//! Common Error Types for the Swap Bridge
//!
//! Provides unified error handling across all modules.
//!
//! Retryability: dispatch and chain errors leave no state behind and are
//! retried by the next settlement run; validation, not-found and
//! invalid-swap-type conditions short-circuit with no persistence writes.

use thiserror::Error;

use crate::types::network::Network;

/// Root error type for the swap bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Malformed input, rejected before any side effect
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown account or swap reference
    #[error("not found: {0}")]
    NotFound(String),

    /// Reconciliation found no incoming transactions at all
    #[error("no deposit detected")]
    NoDeposit,

    /// All observed deposits are already recorded
    #[error("no new deposit detected")]
    NoNewDeposit,

    /// Deposit address could not be minted (fatal, no partial write)
    #[error("account creation failed: {0}")]
    AccountCreation(String),

    /// Direction value outside the enumeration (programming error, fatal)
    #[error("invalid swap type: {0}")]
    InvalidSwapType(String),

    /// No chain client configured for the required network
    #[error("no {0} chain client configured")]
    ChainUnavailable(Network),

    /// External network failure during settlement dispatch (retryable)
    #[error("dispatch failed: {0}")]
    Dispatch(crate::chains::ChainError),

    /// External network failure outside dispatch (retryable)
    #[error("chain error: {0}")]
    Chain(#[from] crate::chains::ChainError),

    /// Storage errors
    #[error("storage error: {0}")]
    Storage(#[from] crate::storage::StorageError),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Logging errors
    #[error("logging error: {0}")]
    Logging(#[from] crate::logging::LoggingError),

    /// Internal errors
    #[error("internal error: {0}")]
    Internal(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Check if this is a retryable error
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BridgeError::Dispatch(_)
                | BridgeError::Chain(_)
                | BridgeError::Storage(_)
                | BridgeError::Io(_)
        )
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            BridgeError::Validation(_) => "VALIDATION_ERROR",
            BridgeError::NotFound(_) => "NOT_FOUND",
            BridgeError::NoDeposit => "NO_DEPOSIT",
            BridgeError::NoNewDeposit => "NO_NEW_DEPOSIT",
            BridgeError::AccountCreation(_) => "ACCOUNT_CREATION_ERROR",
            BridgeError::InvalidSwapType(_) => "INVALID_SWAP_TYPE",
            BridgeError::ChainUnavailable(_) => "CHAIN_UNAVAILABLE",
            BridgeError::Dispatch(_) => "DISPATCH_ERROR",
            BridgeError::Chain(_) => "CHAIN_ERROR",
            BridgeError::Storage(_) => "STORAGE_ERROR",
            BridgeError::Config(_) => "CONFIG_ERROR",
            BridgeError::Logging(_) => "LOGGING_ERROR",
            BridgeError::Internal(_) => "INTERNAL_ERROR",
            BridgeError::Io(_) => "IO_ERROR",
        }
    }
}

/// Result type alias using BridgeError
pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BridgeError::validation("bad address");
        assert!(err.to_string().contains("bad address"));
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_retryable_errors() {
        assert!(BridgeError::Chain(crate::chains::ChainError::Protocol(
            "rpc failed".to_string()
        ))
        .is_retryable());
        assert!(!BridgeError::validation("invalid input").is_retryable());
        assert!(!BridgeError::InvalidSwapType("sideways".to_string()).is_retryable());
        assert!(!BridgeError::NoNewDeposit.is_retryable());
    }
}
