/// Contract adapter
///
/// A [`Contract`] is the live binding between application code and one
/// on-chain contract: it owns a chain client, a [`ContractDescriptor`] and,
/// once known, the contract address. Locally signed and node-signed
/// submissions are both reduced to "submit, then await confirmations".
use crate::config::AdapterConfig;
use crate::error::Error;
use crate::evm::abi::ContractDescriptor;
use crate::evm::client::ChainClient;
use crate::evm::confirmation::{
    await_confirmations_within, await_inclusion_within, ConfirmationStream,
};
use crate::evm::tx::LegacyTransaction;
use crate::evm::types::{EvmError, TransactionParams, TransactionReceipt};
use crate::wallet::TransactionSigner;
use alloy_dyn_abi::DynSolValue;
use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, Bytes, U256};
use alloy_sol_types::SolCall;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Node-held account used when the node signs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedAccount {
    /// A specific unlocked account
    Address(Address),
    /// Whatever account the node lists first
    FirstUnlocked,
}

/// How a transaction gets authorized
#[derive(Clone, Copy)]
pub enum SigningStrategy<'a> {
    /// Sign locally and submit the raw transaction
    Local(&'a dyn TransactionSigner),
    /// Let the node sign with one of its unlocked accounts
    Injected(InjectedAccount),
}

impl std::fmt::Debug for SigningStrategy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SigningStrategy::Local(signer) => f.debug_tuple("Local").field(&signer.address()).finish(),
            SigningStrategy::Injected(account) => f.debug_tuple("Injected").field(account).finish(),
        }
    }
}

/// Parameters of a deployment
#[derive(Debug, Clone, Default)]
pub struct DeployRequest {
    /// Creation bytecode; falls back to the descriptor's bytecode
    pub bytecode: Option<Bytes>,
    /// Constructor arguments
    pub args: Vec<DynSolValue>,
    /// Gas limit; falls back to the configured deploy gas limit
    pub gas_limit: Option<u64>,
}

impl DeployRequest {
    /// Deploy the descriptor's own bytecode with the given constructor arguments
    pub fn new(args: Vec<DynSolValue>) -> Self {
        Self {
            args,
            ..Default::default()
        }
    }

    /// Deploy explicit bytecode instead of the descriptor's
    pub fn bytecode(mut self, bytecode: Bytes) -> Self {
        self.bytecode = Some(bytecode);
        self
    }

    /// Override the deploy gas limit
    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }
}

/// Binding to one on-chain contract instance
#[derive(Clone)]
pub struct Contract {
    client: Arc<dyn ChainClient>,
    descriptor: Arc<ContractDescriptor>,
    address: Option<Address>,
    settings: AdapterConfig,
}

impl std::fmt::Debug for Contract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contract")
            .field("address", &self.address)
            .field("settings", &self.settings)
            .finish()
    }
}

impl Contract {
    /// Create an unbound adapter for `descriptor`
    pub fn new(client: Arc<dyn ChainClient>, descriptor: Arc<ContractDescriptor>) -> Self {
        Self {
            client,
            descriptor,
            address: None,
            settings: AdapterConfig::default(),
        }
    }

    /// Create an adapter bound to an already deployed contract
    pub fn at(
        client: Arc<dyn ChainClient>,
        descriptor: Arc<ContractDescriptor>,
        address: Address,
    ) -> Self {
        Self {
            address: Some(address),
            ..Self::new(client, descriptor)
        }
    }

    /// Replace the transaction policy
    pub fn with_settings(mut self, settings: AdapterConfig) -> Self {
        self.settings = settings;
        self
    }

    /// Attach to an existing deployed contract
    ///
    /// No network call is made. Binding an adapter that already points at a
    /// different address is refused; binding the same address again only
    /// replaces the descriptor.
    pub fn bind(
        &mut self,
        descriptor: Arc<ContractDescriptor>,
        address: Address,
    ) -> Result<(), Error> {
        if let Some(current) = self.address {
            if current != address {
                return Err(Error::Contract(format!(
                    "Contract is already bound to {}, cannot rebind to {}",
                    current, address
                )));
            }
        }

        debug!(%address, "Binding contract");
        self.descriptor = descriptor;
        self.address = Some(address);
        Ok(())
    }

    /// Deploy a new instance and bind to its address
    ///
    /// With [`SigningStrategy::Local`] the deployment resolves once the
    /// transaction is included in a block. With [`SigningStrategy::Injected`]
    /// it resolves once the configured number of confirmations is exceeded.
    /// On any failure the adapter stays unbound.
    pub async fn deploy(
        &mut self,
        strategy: SigningStrategy<'_>,
        request: DeployRequest,
    ) -> Result<TransactionReceipt, Error> {
        if let Some(address) = self.address {
            return Err(Error::Contract(format!(
                "Contract is already deployed at {}",
                address
            )));
        }

        let bytecode = request
            .bytecode
            .or_else(|| self.descriptor.bytecode().cloned())
            .ok_or_else(|| Error::Contract("No bytecode available for deployment".to_string()))?;
        let data = self.descriptor.deployment_data(&bytecode, &request.args)?;
        let gas = request.gas_limit.unwrap_or(self.settings.deploy_gas_limit);

        let receipt = match strategy {
            SigningStrategy::Local(signer) => {
                let params = TransactionParams::deployment(signer.address(), data)
                    .gas(gas)
                    .gas_price(self.gas_price());
                let stream = self.submit_signed(signer, &params).await?;
                await_inclusion_within(stream, self.settings.confirmation_timeout()).await?
            }
            SigningStrategy::Injected(account) => {
                let from = self.injected_address(account).await?;
                let params = TransactionParams::deployment(from, data)
                    .gas(gas)
                    .gas_price(self.gas_price());
                info!(%from, "Deploying contract through node account");
                let stream = self.client.send_transaction(params).await?;
                self.wait(stream, self.settings.confirmations).await?
            }
        };

        let address = receipt.contract_address.ok_or_else(|| {
            Error::Contract(format!(
                "Receipt {} carries no contract address",
                receipt.transaction_hash
            ))
        })?;

        info!(%address, tx_hash = %receipt.transaction_hash, "Contract deployed");
        self.address = Some(address);
        Ok(receipt)
    }

    /// Send locally signed call data to the bound contract
    ///
    /// Uses the configured send gas limit and gas price and resolves once the
    /// configured number of confirmations is exceeded.
    pub async fn send(
        &self,
        signer: &dyn TransactionSigner,
        data: Bytes,
        value: U256,
    ) -> Result<TransactionReceipt, Error> {
        let to = self.require_address()?;
        let params = TransactionParams::call(signer.address(), to, data)
            .gas(self.settings.send_gas_limit)
            .gas_price(self.gas_price())
            .value(value);

        let stream = self.submit_signed(signer, &params).await?;
        self.wait(stream, self.settings.confirmations).await
    }

    /// Send call data to the bound contract with either signing strategy
    pub async fn submit(
        &self,
        strategy: SigningStrategy<'_>,
        data: Bytes,
        value: U256,
    ) -> Result<TransactionReceipt, Error> {
        match strategy {
            SigningStrategy::Local(signer) => self.send(signer, data, value).await,
            SigningStrategy::Injected(account) => {
                let to = self.require_address()?;
                let from = self.injected_address(account).await?;
                let params = TransactionParams::call(from, to, data)
                    .gas(self.settings.send_gas_limit)
                    .gas_price(self.gas_price())
                    .value(value);

                let stream = self.client.send_transaction(params).await?;
                self.wait(stream, self.settings.confirmations).await
            }
        }
    }

    /// Encode a typed call and submit it
    pub async fn transact<C: SolCall>(
        &self,
        strategy: SigningStrategy<'_>,
        call: &C,
        value: U256,
    ) -> Result<TransactionReceipt, Error> {
        debug!(function = C::SIGNATURE, "Submitting contract call");
        self.submit(strategy, Bytes::from(call.abi_encode()), value)
            .await
    }

    /// Perform a typed read-only call against the bound contract
    pub async fn call<C: SolCall>(&self, call: &C) -> Result<C::Return, Error> {
        let to = self.require_address()?;
        let result = self
            .client
            .call(to, Bytes::from(call.abi_encode()))
            .await?;

        C::abi_decode_returns(&result, false).map_err(|e| {
            EvmError::AbiError(format!(
                "Failed to decode {} result: {}",
                C::SIGNATURE,
                e
            ))
            .into()
        })
    }

    /// The chain client this adapter submits through
    pub fn client(&self) -> &Arc<dyn ChainClient> {
        &self.client
    }

    /// The contract ABI
    pub fn abi(&self) -> &JsonAbi {
        self.descriptor.abi()
    }

    /// The descriptor this adapter was created or bound with
    pub fn descriptor(&self) -> &ContractDescriptor {
        &self.descriptor
    }

    /// The artifact JSON of the descriptor
    pub fn json(&self) -> &Value {
        self.descriptor.json()
    }

    /// The bound address, `None` until deployed or bound
    pub fn address(&self) -> Option<Address> {
        self.address
    }

    /// The transaction policy in use
    pub fn settings(&self) -> &AdapterConfig {
        &self.settings
    }

    fn require_address(&self) -> Result<Address, Error> {
        self.address
            .ok_or_else(|| Error::Contract("Contract is not deployed or bound".to_string()))
    }

    fn gas_price(&self) -> u128 {
        u128::from(self.settings.gas_price)
    }

    async fn injected_address(&self, account: InjectedAccount) -> Result<Address, Error> {
        match account {
            InjectedAccount::Address(address) => Ok(address),
            InjectedAccount::FirstUnlocked => self
                .client
                .accounts()
                .await?
                .first()
                .copied()
                .ok_or_else(|| Error::Wallet("Node reports no unlocked accounts".to_string())),
        }
    }

    async fn submit_signed(
        &self,
        signer: &dyn TransactionSigner,
        params: &TransactionParams,
    ) -> Result<ConfirmationStream, Error> {
        let nonce = self.client.transaction_count(params.from).await?;
        let tx = LegacyTransaction::from_params(params, self.client.chain_id(), nonce);
        let signed = signer.sign_transaction(&tx)?;

        debug!(
            from = %params.from,
            to = ?params.to,
            nonce,
            tx_hash = %signed.hash(),
            "Submitting signed transaction"
        );
        self.client.send_raw_transaction(signed.into_raw()).await
    }

    async fn wait(
        &self,
        stream: ConfirmationStream,
        threshold: u64,
    ) -> Result<TransactionReceipt, Error> {
        await_confirmations_within(stream, threshold, self.settings.confirmation_timeout()).await
    }
}
