pub mod config;
pub mod error;
pub mod evm;
#[cfg(feature = "logging")]
pub mod logging;
pub mod wallet;

// Main exports
pub use config::{AdapterConfig, LoggingConfig, NetworkConfig, SdkConfig};
pub use error::Error;
pub use wallet::{LocalAccount, TransactionSigner};

// EVM exports
pub use evm::contracts::{Erc20, FixedSwap, Purchase, SaleParams, SaleState};
pub use evm::{
    ChainClient, Contract, ContractDescriptor, DeployRequest, EvmClient, InjectedAccount,
    SigningStrategy, TransactionReceipt,
};

#[cfg(feature = "logging")]
pub use logging::init_logging;
