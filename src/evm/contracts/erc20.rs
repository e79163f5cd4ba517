/// ERC-20 token contract helpers
///
/// Provides high-level methods for interacting with ERC-20 tokens.
use crate::config::AdapterConfig;
use crate::error::Error;
use crate::evm::abi::ContractDescriptor;
use crate::evm::client::ChainClient;
use crate::evm::contract::{Contract, SigningStrategy};
use crate::evm::types::TransactionReceipt;
use alloy_json_abi::JsonAbi;
use alloy_primitives::{Address, U256};
use alloy_sol_types::sol;
use std::sync::Arc;

sol! {
    #[derive(Debug)]
    interface IERC20 {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);

        event Transfer(address indexed from, address indexed to, uint256 value);
        event Approval(address indexed owner, address indexed spender, uint256 value);
    }
}

/// ERC-20 token helper
#[derive(Debug, Clone)]
pub struct Erc20 {
    contract: Contract,
    address: Address,
}

impl Erc20 {
    /// Create a new ERC-20 helper for the given contract address
    pub fn new(client: Arc<dyn ChainClient>, address: Address) -> Self {
        let descriptor = Arc::new(ContractDescriptor::new(JsonAbi::default(), None));
        Self {
            contract: Contract::at(client, descriptor, address),
            address,
        }
    }

    /// Use `settings` for the token's transactions
    pub fn with_settings(self, settings: AdapterConfig) -> Self {
        Self {
            contract: self.contract.with_settings(settings),
            address: self.address,
        }
    }

    /// Get the contract address
    pub fn address(&self) -> Address {
        self.address
    }

    /// Get token name
    pub async fn name(&self) -> Result<String, Error> {
        let result = self.contract.call(&IERC20::nameCall {}).await?;
        Ok(result._0)
    }

    /// Get token symbol
    pub async fn symbol(&self) -> Result<String, Error> {
        let result = self.contract.call(&IERC20::symbolCall {}).await?;
        Ok(result._0)
    }

    /// Get token decimals
    pub async fn decimals(&self) -> Result<u8, Error> {
        let result = self.contract.call(&IERC20::decimalsCall {}).await?;
        Ok(result._0)
    }

    /// Get total supply
    pub async fn total_supply(&self) -> Result<U256, Error> {
        let result = self.contract.call(&IERC20::totalSupplyCall {}).await?;
        Ok(result._0)
    }

    /// Get balance of an address
    pub async fn balance_of(&self, account: Address) -> Result<U256, Error> {
        let result = self
            .contract
            .call(&IERC20::balanceOfCall { account })
            .await?;
        Ok(result._0)
    }

    /// Get allowance
    pub async fn allowance(&self, owner: Address, spender: Address) -> Result<U256, Error> {
        let result = self
            .contract
            .call(&IERC20::allowanceCall { owner, spender })
            .await?;
        Ok(result._0)
    }

    /// Approve spending
    pub async fn approve(
        &self,
        strategy: SigningStrategy<'_>,
        spender: Address,
        amount: U256,
    ) -> Result<TransactionReceipt, Error> {
        let call = IERC20::approveCall { spender, amount };
        self.contract.transact(strategy, &call, U256::ZERO).await
    }

    /// Transfer tokens
    pub async fn transfer(
        &self,
        strategy: SigningStrategy<'_>,
        to: Address,
        amount: U256,
    ) -> Result<TransactionReceipt, Error> {
        let call = IERC20::transferCall { to, amount };
        self.contract.transact(strategy, &call, U256::ZERO).await
    }
}
