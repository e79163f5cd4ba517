use crate::error::Error;
/// EVM-specific types shared by the client, the signer and the contract adapter
///
/// This module holds the transaction parameter wire shape, the receipt shape
/// consumed from the network, confirmation events and unit conversion helpers.
use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// Number of decimals of the native currency (wei per ether)
pub const NATIVE_DECIMALS: u8 = 18;

/// Transaction parameters handed to a signer or to the node
///
/// This is the wire shape `{data, from, to, gas, gasPrice, value}`; a `to` of
/// `None` denotes contract creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionParams {
    /// Call data or deployment payload
    pub data: Bytes,
    /// Sender address
    pub from: Address,
    /// Target address (None for contract creation)
    pub to: Option<Address>,
    /// Gas limit
    pub gas: u64,
    /// Gas price in wei
    pub gas_price: u128,
    /// Value in wei
    pub value: U256,
}

impl TransactionParams {
    /// Create a contract-creation transaction from `from` carrying `data`
    pub fn deployment(from: Address, data: Bytes) -> Self {
        Self {
            data,
            from,
            to: None,
            gas: 0,
            gas_price: 0,
            value: U256::ZERO,
        }
    }

    /// Create a call transaction from `from` to `to` carrying `data`
    pub fn call(from: Address, to: Address, data: Bytes) -> Self {
        Self {
            to: Some(to),
            ..Self::deployment(from, data)
        }
    }

    /// Set the gas limit
    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = gas;
        self
    }

    /// Set the gas price (wei)
    pub fn gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = gas_price;
        self
    }

    /// Set the transferred value (wei)
    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Whether this transaction creates a contract
    pub fn is_deployment(&self) -> bool {
        self.to.is_none()
    }
}

/// Receipt of a mined transaction
///
/// `contract_address` is only populated for contract creations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    pub from: Address,
    pub to: Option<Address>,
    pub contract_address: Option<Address>,
    /// `true` when execution succeeded, `false` when it reverted
    pub status: bool,
    pub gas_used: u64,
}

impl From<alloy_rpc_types_eth::TransactionReceipt> for TransactionReceipt {
    fn from(receipt: alloy_rpc_types_eth::TransactionReceipt) -> Self {
        Self {
            transaction_hash: receipt.transaction_hash,
            block_number: receipt.block_number,
            from: receipt.from,
            to: receipt.to,
            contract_address: receipt.contract_address,
            status: receipt.status(),
            gas_used: receipt.gas_used as u64,
        }
    }
}

/// A single confirmation event: the transaction is buried under `number` blocks
///
/// Number 1 is the block that includes the transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub number: u64,
    pub receipt: TransactionReceipt,
}

/// EVM-specific errors
#[derive(Debug, thiserror::Error)]
pub enum EvmError {
    #[error("Invalid Ethereum address: {0}")]
    InvalidAddress(String),

    #[error("ABI encoding/decoding error: {0}")]
    AbiError(String),

    #[error("RPC error: {0}")]
    RpcError(String),

    #[error("Transaction failed: {0}")]
    TransactionError(String),

    #[error("Transaction reverted: {0}")]
    TransactionReverted(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

impl From<EvmError> for Error {
    fn from(err: EvmError) -> Self {
        match err {
            EvmError::RpcError(msg) => Error::Rpc(msg),
            other => Error::Evm(other.to_string()),
        }
    }
}

/// Unit conversion helpers
pub mod utils {
    use super::*;

    /// Parse a decimal string (e.g. `"0.03"`) into base units with `decimals` places
    ///
    /// Fractions finer than `decimals` are rejected rather than truncated.
    pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, Error> {
        let amount = amount.trim();
        let (integer_part, decimal_part) = match amount.split_once('.') {
            Some((int, dec)) => (int, dec),
            None => (amount, ""),
        };

        if integer_part.is_empty() && decimal_part.is_empty() {
            return Err(EvmError::InvalidAmount(format!("'{}' is empty", amount)).into());
        }
        if !integer_part.bytes().all(|b| b.is_ascii_digit())
            || !decimal_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(
                EvmError::InvalidAmount(format!("'{}' is not a decimal number", amount)).into(),
            );
        }
        if decimal_part.len() > decimals as usize {
            return Err(EvmError::InvalidAmount(format!(
                "'{}' has more than {} decimal places",
                amount, decimals
            ))
            .into());
        }

        let int_value = if integer_part.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(integer_part, 10)
                .map_err(|e| EvmError::InvalidAmount(format!("'{}': {}", amount, e)))?
        };
        let dec_value = if decimal_part.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(decimal_part, 10)
                .map_err(|e| EvmError::InvalidAmount(format!("'{}': {}", amount, e)))?
        };

        let unit = U256::from(10u64).pow(U256::from(decimals));
        let dec_multiplier =
            U256::from(10u64).pow(U256::from(decimals as usize - decimal_part.len()));

        int_value
            .checked_mul(unit)
            .and_then(|v| v.checked_add(dec_value * dec_multiplier))
            .ok_or_else(|| EvmError::InvalidAmount(format!("'{}' overflows uint256", amount)).into())
    }

    /// Format base units as a decimal string with trailing zeros trimmed
    pub fn format_units(value: U256, decimals: u8) -> String {
        let unit = U256::from(10u64).pow(U256::from(decimals));
        let integer = value / unit;
        let remainder = value % unit;

        if remainder.is_zero() {
            return integer.to_string();
        }

        let fraction = format!("{:0>width$}", remainder.to_string(), width = decimals as usize);
        format!("{}.{}", integer, fraction.trim_end_matches('0'))
    }

    /// Convert an ether amount string to wei
    pub fn parse_ether(ether: &str) -> Result<U256, Error> {
        parse_units(ether, NATIVE_DECIMALS)
    }

    /// Convert wei to an ether amount string
    pub fn format_ether(wei: U256) -> String {
        format_units(wei, NATIVE_DECIMALS)
    }
}
