use crate::config::NetworkConfig;
use crate::error::Error;
use crate::evm::confirmation::{confirmations_at, ConfirmationStream};
use crate::evm::types::{Confirmation, EvmError, TransactionParams, TransactionReceipt};
/// EVM client
///
/// [`ChainClient`] is the boundary the contract adapter talks through:
/// account discovery, nonces, read-only calls, transaction submission and
/// confirmation tracking. [`EvmClient`] implements it over an alloy HTTP
/// provider.
use alloy_primitives::{Address, Bytes, TxKind, B256};
use alloy_provider::{Provider, ProviderBuilder};
use alloy_rpc_types_eth::TransactionRequest;
use alloy_transport_http::{Client, Http};
use async_trait::async_trait;
use futures::channel::mpsc;
use futures::StreamExt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default interval between receipt polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Default number of confirmations after which a stream ends
pub const DEFAULT_CONFIRMATION_BLOCKS: u64 = 24;

/// Operations the contract adapter needs from a chain client
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// EIP-155 chain id
    fn chain_id(&self) -> u64;

    /// Accounts unlocked on the node (`eth_accounts`)
    async fn accounts(&self) -> Result<Vec<Address>, Error>;

    /// Next nonce for `address`
    async fn transaction_count(&self, address: Address) -> Result<u64, Error>;

    /// Read-only call against `to`
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, Error>;

    /// Submit a signed transaction and observe its confirmations
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<ConfirmationStream, Error>;

    /// Submit a transaction for the node to sign with one of its accounts
    async fn send_transaction(&self, params: TransactionParams)
        -> Result<ConfirmationStream, Error>;

    /// Receipt of a mined transaction, `None` while pending
    async fn transaction_receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>, Error>;
}

/// EVM Client for blockchain interactions
#[derive(Clone)]
pub struct EvmClient {
    /// Alloy provider for RPC communication
    provider: alloy_provider::RootProvider<Http<Client>>,
    /// Chain ID for transaction signing
    chain_id: u64,
    poll_interval: Duration,
    confirmation_blocks: u64,
}

impl std::fmt::Debug for EvmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmClient")
            .field("chain_id", &self.chain_id)
            .field("poll_interval", &self.poll_interval)
            .field("confirmation_blocks", &self.confirmation_blocks)
            .finish()
    }
}

impl EvmClient {
    /// Create a new EVM client with the given RPC endpoint and chain ID
    ///
    /// No request is made; use [`EvmClient::connect`] to verify the endpoint.
    pub fn new(rpc_url: &str, chain_id: u64) -> Result<Self, Error> {
        let url = url::Url::parse(rpc_url)
            .map_err(|e| Error::Config(format!("Invalid RPC URL: {}", e)))?;
        let provider = ProviderBuilder::new().on_http(url);

        Ok(Self {
            provider,
            chain_id,
            poll_interval: DEFAULT_POLL_INTERVAL,
            confirmation_blocks: DEFAULT_CONFIRMATION_BLOCKS,
        })
    }

    /// Create a client for `network` and check that the node serves its chain
    pub async fn connect(network: &NetworkConfig) -> Result<Self, Error> {
        let client = Self::new(&network.rpc_url, network.chain_id)?
            .with_poll_interval(Duration::from_millis(network.poll_interval_ms))
            .with_confirmation_blocks(network.confirmation_blocks);

        let remote_chain_id = client
            .provider
            .get_chain_id()
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()))?;

        if remote_chain_id != network.chain_id {
            return Err(Error::Config(format!(
                "Network '{}' expects chain id {} but {} reports {}",
                network.name, network.chain_id, network.rpc_url, remote_chain_id
            )));
        }

        info!(
            network = %network.name,
            chain_id = remote_chain_id,
            "Connected to EVM node"
        );
        Ok(client)
    }

    /// Set the interval between receipt polls
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Set how many confirmations a stream reports before ending
    pub fn with_confirmation_blocks(mut self, confirmation_blocks: u64) -> Self {
        self.confirmation_blocks = confirmation_blocks;
        self
    }

    /// Poll the receipt of `tx_hash` and report one confirmation per new block
    ///
    /// The polling task ends on a reverted receipt, on an RPC error, after
    /// `confirmation_blocks` confirmations, or once the stream is dropped.
    fn watch_confirmations(&self, tx_hash: B256) -> ConfirmationStream {
        let (sender, receiver) = mpsc::unbounded();
        let provider = self.provider.clone();
        let poll_interval = self.poll_interval;
        let mut tracker = ConfirmationTracker::new(tx_hash, self.confirmation_blocks);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);

            loop {
                ticker.tick().await;
                if sender.is_closed() {
                    debug!(%tx_hash, "Confirmation stream dropped, stop polling");
                    break;
                }

                let receipt = match provider.get_transaction_receipt(tx_hash).await {
                    Ok(Some(receipt)) => TransactionReceipt::from(receipt),
                    Ok(None) => continue,
                    Err(e) => {
                        forward(&sender, vec![Err(EvmError::RpcError(e.to_string()).into())]);
                        break;
                    }
                };

                let head = match provider.get_block_number().await {
                    Ok(head) => head,
                    Err(e) => {
                        forward(&sender, vec![Err(EvmError::RpcError(e.to_string()).into())]);
                        break;
                    }
                };

                let outcome = tracker.observe(&receipt, head);
                if !forward(&sender, outcome.events) {
                    debug!(%tx_hash, "Confirmation stream dropped, stop polling");
                    break;
                }
                if outcome.finished {
                    break;
                }
            }
        });

        receiver.boxed()
    }
}

/// Confirmation bookkeeping of one polled transaction
#[derive(Debug)]
struct ConfirmationTracker {
    tx_hash: B256,
    /// Next confirmation number to report
    next: u64,
    max_confirmations: u64,
}

/// Events produced by one receipt poll
#[derive(Debug)]
struct PollOutcome {
    events: Vec<Result<Confirmation, Error>>,
    finished: bool,
}

impl ConfirmationTracker {
    fn new(tx_hash: B256, max_confirmations: u64) -> Self {
        Self {
            tx_hash,
            next: 0,
            max_confirmations,
        }
    }

    /// Events for `receipt` observed while the chain head is at `head`
    ///
    /// A reverted receipt yields one error and finishes. Otherwise each
    /// confirmation number not reported yet, up to the head and capped at
    /// `max_confirmations`, is reported exactly once.
    fn observe(&mut self, receipt: &TransactionReceipt, head: u64) -> PollOutcome {
        if !receipt.status {
            warn!(tx_hash = %self.tx_hash, "Transaction reverted");
            let error = EvmError::TransactionReverted(format!(
                "{} reverted in block {:?}",
                self.tx_hash, receipt.block_number
            ));
            return PollOutcome {
                events: vec![Err(error.into())],
                finished: true,
            };
        }

        let reached = receipt
            .block_number
            .and_then(|mined_block| confirmations_at(head, mined_block))
            .map(|number| number.min(self.max_confirmations));

        let mut events = Vec::new();
        if let Some(reached) = reached {
            while self.next <= reached {
                events.push(Ok(Confirmation {
                    number: self.next,
                    receipt: receipt.clone(),
                }));
                self.next += 1;
            }
        }

        PollOutcome {
            events,
            finished: self.next > self.max_confirmations,
        }
    }
}

/// Send `events` in order; `false` once the receiver is gone
fn forward(
    sender: &mpsc::UnboundedSender<Result<Confirmation, Error>>,
    events: Vec<Result<Confirmation, Error>>,
) -> bool {
    events
        .into_iter()
        .all(|event| sender.unbounded_send(event).is_ok())
}

#[async_trait]
impl ChainClient for EvmClient {
    fn chain_id(&self) -> u64 {
        self.chain_id
    }

    async fn accounts(&self) -> Result<Vec<Address>, Error> {
        let accounts = self
            .provider
            .get_accounts()
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()))?;

        Ok(accounts)
    }

    async fn transaction_count(&self, address: Address) -> Result<u64, Error> {
        let nonce = self
            .provider
            .get_transaction_count(address)
            .pending()
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()))?;

        Ok(nonce)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes, Error> {
        let tx_request = TransactionRequest {
            to: Some(TxKind::Call(to)),
            input: data.into(),
            ..Default::default()
        };

        let result = self
            .provider
            .call(&tx_request)
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()))?;

        Ok(result)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<ConfirmationStream, Error> {
        let pending = self
            .provider
            .send_raw_transaction(&raw)
            .await
            .map_err(|e| EvmError::TransactionError(e.to_string()))?;
        let tx_hash = *pending.tx_hash();

        info!(%tx_hash, "Submitted raw transaction");
        Ok(self.watch_confirmations(tx_hash))
    }

    async fn send_transaction(
        &self,
        params: TransactionParams,
    ) -> Result<ConfirmationStream, Error> {
        debug!(from = %params.from, to = ?params.to, gas = params.gas, "eth_sendTransaction");

        let tx_request = TransactionRequest {
            from: Some(params.from),
            to: params.to.map(TxKind::Call),
            gas: Some(params.gas),
            gas_price: Some(params.gas_price),
            value: Some(params.value),
            input: params.data.into(),
            ..Default::default()
        };

        let pending = self
            .provider
            .send_transaction(tx_request)
            .await
            .map_err(|e| EvmError::TransactionError(e.to_string()))?;
        let tx_hash = *pending.tx_hash();

        info!(%tx_hash, "Submitted transaction through node account");
        Ok(self.watch_confirmations(tx_hash))
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>, Error> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(|e| EvmError::RpcError(e.to_string()))?;

        Ok(receipt.map(TransactionReceipt::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evm::confirmation::{await_confirmations, DEFAULT_CONFIRMATIONS};
    use serde_json::{json, Value};
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::TcpListener;
    use tokio_test::{assert_pending, task};

    const MINED_BLOCK: u64 = 100;

    fn receipt(status: bool, block_number: Option<u64>) -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: B256::repeat_byte(0xab),
            block_number,
            from: Address::repeat_byte(0x01),
            to: Some(Address::repeat_byte(0x02)),
            contract_address: None,
            status,
            gas_used: 21_000,
        }
    }

    fn numbers(outcome: &PollOutcome) -> Vec<u64> {
        outcome
            .events
            .iter()
            .map(|event| event.as_ref().unwrap().number)
            .collect()
    }

    /// Serve one JSON-RPC response per connection and return the requests seen
    async fn rpc_node(results: Vec<Value>) -> (String, tokio::task::JoinHandle<Vec<Value>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for result in results {
                let (socket, _) = listener.accept().await.unwrap();
                let mut reader = BufReader::new(socket);

                let mut content_length = 0;
                loop {
                    let mut line = String::new();
                    reader.read_line(&mut line).await.unwrap();
                    let line = line.trim_end();
                    if line.is_empty() {
                        break;
                    }
                    if let Some((name, value)) = line.split_once(':') {
                        if name.eq_ignore_ascii_case("content-length") {
                            content_length = value.trim().parse().unwrap();
                        }
                    }
                }

                let mut body = vec![0u8; content_length];
                reader.read_exact(&mut body).await.unwrap();
                let request: Value = serde_json::from_slice(&body).unwrap();

                let response =
                    json!({"jsonrpc": "2.0", "id": request["id"], "result": result}).to_string();
                let mut socket = reader.into_inner();
                socket
                    .write_all(
                        format!(
                            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                            response.len(),
                            response
                        )
                        .as_bytes(),
                    )
                    .await
                    .unwrap();
                socket.shutdown().await.unwrap();
                requests.push(request);
            }
            requests
        });

        (url, handle)
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(matches!(
            EvmClient::new("not a url", 1),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_new_defaults() {
        let client = EvmClient::new("http://localhost:8545", 1337).unwrap();
        assert_eq!(ChainClient::chain_id(&client), 1337);
        assert_eq!(client.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(client.confirmation_blocks, DEFAULT_CONFIRMATION_BLOCKS);

        let client = client
            .with_poll_interval(Duration::from_millis(250))
            .with_confirmation_blocks(12);
        assert_eq!(client.poll_interval, Duration::from_millis(250));
        assert_eq!(client.confirmation_blocks, 12);
    }

    #[tokio::test]
    async fn test_confirmation_stream_reports_rpc_failure() {
        // Nothing listens on port 1, so the first receipt poll fails
        let client = EvmClient::new("http://127.0.0.1:1", 1337)
            .unwrap()
            .with_poll_interval(Duration::from_millis(10));

        let mut stream = client.watch_confirmations(B256::repeat_byte(0x01));
        let first = stream.next().await.unwrap();
        assert!(matches!(first, Err(Error::Rpc(_))));
        assert!(stream.next().await.is_none());
    }

    #[test]
    fn test_inclusion_block_is_confirmation_zero() {
        let mut tracker = ConfirmationTracker::new(B256::ZERO, DEFAULT_CONFIRMATION_BLOCKS);
        let mined = receipt(true, Some(MINED_BLOCK));

        let outcome = tracker.observe(&mined, MINED_BLOCK);
        assert_eq!(numbers(&outcome), vec![0]);
        assert!(!outcome.finished);

        // Same head again reports nothing new
        let outcome = tracker.observe(&mined, MINED_BLOCK);
        assert!(outcome.events.is_empty());

        // Several blocks between polls are each reported once
        let outcome = tracker.observe(&mined, MINED_BLOCK + 3);
        assert_eq!(numbers(&outcome), vec![1, 2, 3]);
    }

    #[test]
    fn test_eight_blocks_after_inclusion_do_not_resolve() {
        let mut tracker = ConfirmationTracker::new(B256::ZERO, DEFAULT_CONFIRMATION_BLOCKS);
        let mined = receipt(true, Some(MINED_BLOCK));

        let events: Vec<_> = (MINED_BLOCK..=MINED_BLOCK + 8)
            .flat_map(|head| tracker.observe(&mined, head).events)
            .collect();
        let emitted: Vec<u64> = events.iter().map(|e| e.as_ref().unwrap().number).collect();
        assert_eq!(emitted, (0..=8).collect::<Vec<_>>());

        let stream = futures::stream::iter(events)
            .chain(futures::stream::pending())
            .boxed();
        let mut fut = task::spawn(await_confirmations(stream, DEFAULT_CONFIRMATIONS));
        assert_pending!(fut.poll());

        // The ninth block after inclusion passes the threshold
        let next = tracker.observe(&mined, MINED_BLOCK + 9);
        assert_eq!(numbers(&next), vec![9]);
    }

    #[test]
    fn test_lagging_head_or_unmined_receipt_reports_nothing() {
        let mut tracker = ConfirmationTracker::new(B256::ZERO, DEFAULT_CONFIRMATION_BLOCKS);

        let outcome = tracker.observe(&receipt(true, Some(MINED_BLOCK)), MINED_BLOCK - 1);
        assert!(outcome.events.is_empty());
        assert!(!outcome.finished);

        let outcome = tracker.observe(&receipt(true, None), MINED_BLOCK);
        assert!(outcome.events.is_empty());
        assert!(!outcome.finished);
    }

    #[test]
    fn test_reverted_receipt_fails_and_finishes() {
        let mut tracker = ConfirmationTracker::new(B256::ZERO, DEFAULT_CONFIRMATION_BLOCKS);

        let outcome = tracker.observe(&receipt(false, Some(MINED_BLOCK)), MINED_BLOCK + 2);
        assert_eq!(outcome.events.len(), 1);
        assert!(matches!(outcome.events[0], Err(Error::Evm(_))));
        assert!(outcome.finished);
    }

    #[test]
    fn test_confirmations_are_capped() {
        let mut tracker = ConfirmationTracker::new(B256::ZERO, 3);
        let mined = receipt(true, Some(MINED_BLOCK));

        let outcome = tracker.observe(&mined, MINED_BLOCK + 10);
        assert_eq!(numbers(&outcome), vec![0, 1, 2, 3]);
        assert!(outcome.finished);
    }

    #[test]
    fn test_forward_stops_once_receiver_dropped() {
        let (sender, receiver) = mpsc::unbounded();
        let confirmation = |number| {
            Ok(Confirmation {
                number,
                receipt: receipt(true, Some(MINED_BLOCK)),
            })
        };

        assert!(forward(&sender, vec![confirmation(0)]));
        drop(receiver);
        assert!(!forward(&sender, vec![confirmation(1)]));
        assert!(sender.is_closed());
    }

    #[tokio::test]
    async fn test_transaction_count_uses_pending_block() {
        let (url, node) = rpc_node(vec![json!("0x7")]).await;
        let client = EvmClient::new(&url, 1337).unwrap();

        let nonce = client
            .transaction_count(Address::repeat_byte(0x11))
            .await
            .unwrap();
        assert_eq!(nonce, 7);

        let requests = node.await.unwrap();
        assert_eq!(requests[0]["method"], "eth_getTransactionCount");
        assert_eq!(requests[0]["params"][1], "pending");
    }

    #[tokio::test]
    async fn test_connect_checks_chain_id() {
        let (url, _node) = rpc_node(vec![json!("0x1")]).await;
        let network = NetworkConfig {
            rpc_url: url,
            ..NetworkConfig::default()
        };
        assert!(matches!(
            EvmClient::connect(&network).await,
            Err(Error::Config(_))
        ));

        let (url, _node) = rpc_node(vec![json!("0x539")]).await;
        let network = NetworkConfig {
            rpc_url: url,
            ..NetworkConfig::default()
        };
        let client = EvmClient::connect(&network).await.unwrap();
        assert_eq!(ChainClient::chain_id(&client), 1337);
    }
}
