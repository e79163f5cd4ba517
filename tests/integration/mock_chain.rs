//! Scripted chain client for adapter tests
//!
//! `MockChainClient` never touches a network. Every submission consumes the
//! next `Script`, which decides which confirmation events the returned stream
//! yields. Submitted transactions and calls are recorded for inspection.

#![allow(dead_code)]

use alloy_consensus::{Signed, TxEnvelope, TxLegacy};
use alloy_eips::eip2718::Decodable2718;
use alloy_primitives::{address, keccak256, Address, Bytes, B256};
use async_trait::async_trait;
use fixed_swap_sdk::evm::{
    ChainClient, Confirmation, ConfirmationStream, TransactionParams, TransactionReceipt,
};
use fixed_swap_sdk::Error;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

pub const CHAIN_ID: u64 = 1337;
pub const DEPLOYED_ADDRESS: Address = address!("cccccccccccccccccccccccccccccccccccccccc");
pub const NODE_ACCOUNT: Address = address!("a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1a1");
pub const SECOND_NODE_ACCOUNT: Address = address!("a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2a2");
pub const MINED_BLOCK: u64 = 100;

/// Hardhat/anvil development key #0
pub const DEV_PRIVATE_KEY: &str =
    "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

#[derive(Debug, Clone)]
enum Event {
    Confirm,
    Fail(String),
}

/// Events yielded by one confirmation stream
#[derive(Debug, Clone)]
pub struct Script {
    events: Vec<Event>,
    pending: bool,
}

impl Script {
    /// Inclusion (confirmation 0) and confirmations 1..=n, then the stream closes
    pub fn confirmations(n: u64) -> Self {
        Self {
            events: (0..=n).map(|_| Event::Confirm).collect(),
            pending: false,
        }
    }

    /// Confirmations 0..=n, then the stream stays open without yielding
    pub fn confirmations_then_pending(n: u64) -> Self {
        Self {
            pending: true,
            ..Self::confirmations(n)
        }
    }

    /// Confirmations 0..=n, an error, then more confirmations
    pub fn error_after(n: u64, message: &str) -> Self {
        let mut events: Vec<Event> = (0..=n).map(|_| Event::Confirm).collect();
        events.push(Event::Fail(message.to_string()));
        events.extend((0..5).map(|_| Event::Confirm));
        Self {
            events,
            pending: false,
        }
    }
}

#[derive(Default)]
struct State {
    accounts: Vec<Address>,
    nonce: u64,
    scripts: VecDeque<Script>,
    omit_contract_address: bool,
    submission_error: Option<String>,
    raw_transactions: Vec<Signed<TxLegacy>>,
    sent_transactions: Vec<TransactionParams>,
    call_responses: HashMap<[u8; 4], Bytes>,
    calls: Vec<(Address, Bytes)>,
}

pub struct MockChainClient {
    state: Mutex<State>,
}

impl MockChainClient {
    /// Node with two unlocked accounts and nonce 7 for every sender
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                accounts: vec![NODE_ACCOUNT, SECOND_NODE_ACCOUNT],
                nonce: 7,
                ..Default::default()
            }),
        }
    }

    pub fn with_accounts(self, accounts: Vec<Address>) -> Self {
        self.state.lock().unwrap().accounts = accounts;
        self
    }

    /// Queue the confirmation script of the next submission
    pub fn push_script(&self, script: Script) {
        self.state.lock().unwrap().scripts.push_back(script);
    }

    /// Receipts carry no contract address
    pub fn omit_contract_address(&self) {
        self.state.lock().unwrap().omit_contract_address = true;
    }

    /// Every submission fails with `message`
    pub fn fail_submissions(&self, message: &str) {
        self.state.lock().unwrap().submission_error = Some(message.to_string());
    }

    /// Answer calls starting with `selector` with `response`
    pub fn respond(&self, selector: [u8; 4], response: Vec<u8>) {
        self.state
            .lock()
            .unwrap()
            .call_responses
            .insert(selector, Bytes::from(response));
    }

    pub fn raw_transactions(&self) -> Vec<Signed<TxLegacy>> {
        self.state.lock().unwrap().raw_transactions.clone()
    }

    pub fn sent_transactions(&self) -> Vec<TransactionParams> {
        self.state.lock().unwrap().sent_transactions.clone()
    }

    pub fn calls(&self) -> Vec<(Address, Bytes)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn submissions(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.raw_transactions.len() + state.sent_transactions.len()
    }

    fn receipt(
        &self,
        hash: B256,
        from: Address,
        to: Option<Address>,
        omit_contract_address: bool,
    ) -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: hash,
            block_number: Some(MINED_BLOCK),
            from,
            to,
            contract_address: if to.is_none() && !omit_contract_address {
                Some(DEPLOYED_ADDRESS)
            } else {
                None
            },
            status: true,
            gas_used: 21_000,
        }
    }

    fn stream(receipt: TransactionReceipt, script: Script) -> ConfirmationStream {
        let mut number = 0;
        let events: Vec<Result<Confirmation, Error>> = script
            .events
            .into_iter()
            .map(|event| match event {
                Event::Confirm => {
                    let confirmation = Confirmation {
                        number,
                        receipt: receipt.clone(),
                    };
                    number += 1;
                    Ok(confirmation)
                }
                Event::Fail(message) => Err(Error::Evm(message)),
            })
            .collect();

        let head = stream::iter(events);
        if script.pending {
            head.chain(stream::pending()).boxed()
        } else {
            head.boxed()
        }
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    fn chain_id(&self) -> u64 {
        CHAIN_ID
    }

    async fn accounts(&self) -> Result<Vec<Address>, Error> {
        Ok(self.state.lock().unwrap().accounts.clone())
    }

    async fn transaction_count(&self, _address: Address) -> Result<u64, Error> {
        Ok(self.state.lock().unwrap().nonce)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, Error> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((to, data.clone()));

        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| Error::Rpc("call data too short".to_string()))?;
        state
            .call_responses
            .get(&selector)
            .cloned()
            .ok_or_else(|| Error::Rpc("execution reverted".to_string()))
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<ConfirmationStream, Error> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.submission_error {
            return Err(Error::Rpc(message.clone()));
        }

        let envelope = TxEnvelope::decode_2718(&mut raw.as_ref())
            .map_err(|e| Error::Rpc(format!("undecodable raw transaction: {}", e)))?;
        let signed = match envelope {
            TxEnvelope::Legacy(signed) => signed,
            other => return Err(Error::Rpc(format!("unexpected envelope {:?}", other.tx_type()))),
        };
        let from = signed
            .recover_signer()
            .map_err(|e| Error::Rpc(format!("invalid signature: {}", e)))?;
        let to = signed.tx().to.to().copied();

        let receipt = self.receipt(keccak256(&raw), from, to, state.omit_contract_address);
        let script = state
            .scripts
            .pop_front()
            .unwrap_or_else(|| Script::confirmations(9));
        state.raw_transactions.push(signed);

        Ok(Self::stream(receipt, script))
    }

    async fn send_transaction(
        &self,
        params: TransactionParams,
    ) -> Result<ConfirmationStream, Error> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.submission_error {
            return Err(Error::Rpc(message.clone()));
        }

        let hash = keccak256(serde_json::to_vec(&params)?);
        let receipt = self.receipt(hash, params.from, params.to, state.omit_contract_address);
        let script = state
            .scripts
            .pop_front()
            .unwrap_or_else(|| Script::confirmations(9));
        state.sent_transactions.push(params);

        Ok(Self::stream(receipt, script))
    }

    async fn transaction_receipt(&self, _hash: B256) -> Result<Option<TransactionReceipt>, Error> {
        Ok(None)
    }
}
