use thiserror::Error;

/// Errors returned by the SDK
///
/// Variants mark where a failure came from. The underlying message is kept
/// verbatim; nothing in the SDK retries or reinterprets it.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or missing configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport or node-side JSON-RPC failure
    #[error("RPC error: {0}")]
    Rpc(String),

    /// Key handling or signing failure
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// EVM execution, revert or ABI codec failure
    #[error("EVM error: {0}")]
    Evm(String),

    /// Misuse of a contract binding (not deployed, already bound, ...)
    #[error("Contract error: {0}")]
    Contract(String),

    /// The confirmation stream ended or timed out before the threshold
    #[error("Confirmation error: {0}")]
    Confirmation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}
