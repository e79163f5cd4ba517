/// EVM support
///
/// Everything needed to deploy and drive contracts on an EVM-compatible
/// network: the chain client boundary, transaction building, contract
/// descriptors, confirmation tracking and the contract adapter.
///
/// # Example
///
/// ```rust,no_run
/// use fixed_swap_sdk::evm::{
///     ChainClient, Contract, ContractDescriptor, DeployRequest, EvmClient, SigningStrategy,
/// };
/// use fixed_swap_sdk::wallet::LocalAccount;
/// use fixed_swap_sdk::SdkConfig;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = SdkConfig::load()?;
/// let client: Arc<dyn ChainClient> = Arc::new(EvmClient::connect(&config.network).await?);
/// let descriptor = Arc::new(ContractDescriptor::from_file("artifacts/Token.json")?);
/// let deployer = LocalAccount::from_mnemonic("test test test test test test test test test test test junk", 0)?;
///
/// let mut token = Contract::new(client, descriptor).with_settings(config.adapter);
/// let receipt = token
///     .deploy(SigningStrategy::Local(&deployer), DeployRequest::default())
///     .await?;
/// println!("Deployed at {:?} in {}", token.address(), receipt.transaction_hash);
/// # Ok(())
/// # }
/// ```
pub mod abi;
pub mod client;
pub mod confirmation;
pub mod contract;
pub mod contracts;
pub mod tx;
pub mod types;

pub use abi::ContractDescriptor;
pub use client::{ChainClient, EvmClient};
pub use confirmation::{await_confirmations, await_inclusion, ConfirmationStream};
pub use contract::{Contract, DeployRequest, InjectedAccount, SigningStrategy};
pub use tx::{LegacyTransaction, SignedTransaction};
pub use types::{Confirmation, EvmError, TransactionParams, TransactionReceipt};
