// Allow deprecated Signature for compatibility with alloy-consensus ecosystem
#![allow(deprecated)]

use crate::evm::types::TransactionParams;
use alloy_consensus::{SignableTransaction, Signed, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Encodable2718;
use alloy_primitives::{Address, Bytes, ChainId, Signature, TxKind, B256, U256};

/// Convenience builder for constructing and signing EIP-155 legacy transactions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LegacyTransaction {
    pub chain_id: ChainId,
    pub nonce: u64,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
}

impl LegacyTransaction {
    /// Create a new transaction with default zeroed value/data.
    pub fn new(chain_id: u64, nonce: u64) -> Self {
        Self {
            chain_id,
            nonce,
            gas_limit: 21_000,
            gas_price: 0,
            to: None,
            value: U256::ZERO,
            data: Bytes::new(),
        }
    }

    /// Build the transaction described by `params` for the given chain and nonce.
    pub fn from_params(params: &TransactionParams, chain_id: u64, nonce: u64) -> Self {
        Self::new(chain_id, nonce)
            .to(params.to)
            .value(params.value)
            .data(params.data.clone())
            .gas_limit(params.gas)
            .gas_price(params.gas_price)
    }

    /// Set the target address (None implies contract creation).
    pub fn to(mut self, to: Option<Address>) -> Self {
        self.to = to;
        self
    }

    /// Set the value (in wei) to transfer.
    pub fn value(mut self, value: U256) -> Self {
        self.value = value;
        self
    }

    /// Set the calldata payload.
    pub fn data(mut self, data: Bytes) -> Self {
        self.data = data;
        self
    }

    /// Set the gas limit for the transaction.
    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    /// Set the gas price (wei).
    pub fn gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = gas_price;
        self
    }

    fn to_kind(&self) -> TxKind {
        self.to.map(TxKind::Call).unwrap_or(TxKind::Create)
    }

    fn to_alloy(&self) -> TxLegacy {
        TxLegacy {
            chain_id: Some(self.chain_id),
            nonce: self.nonce,
            gas_price: self.gas_price,
            gas_limit: self.gas_limit,
            to: self.to_kind(),
            value: self.value,
            input: self.data.clone(),
        }
    }

    /// Bytes that should be hashed (keccak256) for signing.
    pub fn encoded_for_signing(&self) -> Vec<u8> {
        self.to_alloy().encoded_for_signing()
    }

    /// Signature hash (keccak256) of the transaction.
    pub fn signature_hash(&self) -> B256 {
        self.to_alloy().signature_hash()
    }

    /// Combine with a signature producing a signed transaction with its raw encoding.
    pub fn into_signed(self, signature: Signature) -> SignedTransaction {
        let signed = self.to_alloy().into_signed(signature);
        let raw = Bytes::from(TxEnvelope::Legacy(signed.clone()).encoded_2718());
        SignedTransaction::new(signed, raw)
    }
}

/// Wrapper containing the fully signed transaction and raw payload.
#[derive(Clone, Debug)]
pub struct SignedTransaction {
    signed: Signed<TxLegacy>,
    raw: Bytes,
}

impl SignedTransaction {
    pub fn new(signed: Signed<TxLegacy>, raw: Bytes) -> Self {
        Self { signed, raw }
    }

    /// Raw bytes ready to be sent via `eth_sendRawTransaction`.
    pub fn raw(&self) -> &Bytes {
        &self.raw
    }

    /// Transaction hash computed from the signed payload.
    pub fn hash(&self) -> B256 {
        *self.signed.hash()
    }

    /// Access signature data (v, r, s).
    pub fn signature(&self) -> &Signature {
        self.signed.signature()
    }

    /// Borrow the inner signed transaction structure.
    pub fn as_signed(&self) -> &Signed<TxLegacy> {
        &self.signed
    }

    /// Consume wrapper and return raw bytes.
    pub fn into_raw(self) -> Bytes {
        self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_params() {
        let from = Address::repeat_byte(0x01);
        let to = Address::repeat_byte(0x02);
        let params = TransactionParams::call(from, to, Bytes::from(vec![0xaa]))
            .gas(4_430_000)
            .gas_price(20_000_000_000)
            .value(U256::from(5u64));

        let tx = LegacyTransaction::from_params(&params, 1337, 7);
        assert_eq!(tx.chain_id, 1337);
        assert_eq!(tx.nonce, 7);
        assert_eq!(tx.to, Some(to));
        assert_eq!(tx.gas_limit, 4_430_000);
        assert_eq!(tx.gas_price, 20_000_000_000);
        assert_eq!(tx.value, U256::from(5u64));
        assert_eq!(tx.data, Bytes::from(vec![0xaa]));
    }

    #[test]
    fn test_deployment_targets_create() {
        let params = TransactionParams::deployment(Address::ZERO, Bytes::from(vec![0x60]));
        let tx = LegacyTransaction::from_params(&params, 1, 0);
        assert_eq!(tx.to_kind(), TxKind::Create);
    }

    #[test]
    fn test_signature_hash_depends_on_chain_id() {
        let a = LegacyTransaction::new(1, 0);
        let b = LegacyTransaction::new(2, 0);
        assert_ne!(a.signature_hash(), b.signature_hash());
    }
}
