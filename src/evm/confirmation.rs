/// Confirmation tracking
///
/// A submitted transaction is observed through a [`ConfirmationStream`]: one
/// `Ok(Confirmation)` per newly observed block on top of the transaction, or
/// an `Err` that terminates the observation. [`await_confirmations`] turns
/// such a stream into a single result that settles exactly once.
use crate::error::Error;
use crate::evm::types::{Confirmation, TransactionReceipt};
use futures::stream::BoxStream;
use futures::StreamExt;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Stream of confirmation events for one submitted transaction
pub type ConfirmationStream = BoxStream<'static, Result<Confirmation, Error>>;

/// Confirmations that must be exceeded before a send or injected deploy resolves
pub const DEFAULT_CONFIRMATIONS: u64 = 8;

/// Wait until a confirmation numbered strictly above `threshold` arrives
///
/// The block containing the transaction is confirmation 0; each block mined
/// on top of it adds one. Resolves with the receipt of the first
/// confirmation past the threshold. The first error on the stream rejects,
/// whatever number of confirmations preceded it. A stream that ends before
/// the threshold is passed also rejects. While the stream stays open without
/// reaching the threshold, the returned future stays pending.
pub async fn await_confirmations(
    mut stream: ConfirmationStream,
    threshold: u64,
) -> Result<TransactionReceipt, Error> {
    while let Some(event) = stream.next().await {
        match event {
            Ok(confirmation) if confirmation.number > threshold => {
                debug!(
                    tx_hash = %confirmation.receipt.transaction_hash,
                    confirmations = confirmation.number,
                    "Confirmation threshold passed"
                );
                return Ok(confirmation.receipt);
            }
            Ok(confirmation) => {
                debug!(
                    tx_hash = %confirmation.receipt.transaction_hash,
                    "Confirmation {}/{}",
                    confirmation.number,
                    threshold + 1
                );
            }
            Err(e) => {
                warn!("Confirmation stream failed: {}", e);
                return Err(e);
            }
        }
    }

    Err(Error::Confirmation(format!(
        "Confirmation stream ended before {} confirmations",
        threshold + 1
    )))
}

/// Wait for the first confirmation event, whatever its number
///
/// Resolves with the receipt of the block that included the transaction.
pub async fn await_inclusion(mut stream: ConfirmationStream) -> Result<TransactionReceipt, Error> {
    match stream.next().await {
        Some(Ok(confirmation)) => {
            debug!(
                tx_hash = %confirmation.receipt.transaction_hash,
                block = ?confirmation.receipt.block_number,
                "Transaction included"
            );
            Ok(confirmation.receipt)
        }
        Some(Err(e)) => {
            warn!("Confirmation stream failed: {}", e);
            Err(e)
        }
        None => Err(Error::Confirmation(
            "Confirmation stream ended before inclusion".to_string(),
        )),
    }
}

/// [`await_confirmations`] bounded by an optional timeout
///
/// `None` waits without bound.
pub async fn await_confirmations_within(
    stream: ConfirmationStream,
    threshold: u64,
    timeout: Option<Duration>,
) -> Result<TransactionReceipt, Error> {
    bounded(
        timeout,
        await_confirmations(stream, threshold),
        format!("{} confirmations", threshold + 1),
    )
    .await
}

/// [`await_inclusion`] bounded by an optional timeout
pub async fn await_inclusion_within(
    stream: ConfirmationStream,
    timeout: Option<Duration>,
) -> Result<TransactionReceipt, Error> {
    bounded(timeout, await_inclusion(stream), "inclusion".to_string()).await
}

async fn bounded<F>(
    timeout: Option<Duration>,
    wait: F,
    awaited: String,
) -> Result<TransactionReceipt, Error>
where
    F: Future<Output = Result<TransactionReceipt, Error>>,
{
    match timeout {
        None => wait.await,
        Some(limit) => tokio::time::timeout(limit, wait).await.map_err(|_| {
            Error::Confirmation(format!(
                "Timed out after {}s waiting for {}",
                limit.as_secs(),
                awaited
            ))
        })?,
    }
}

/// Confirmation number of a transaction mined at `mined_block` when the chain head is `head`
///
/// `None` while the node's head lags behind the receipt's block.
pub fn confirmations_at(head: u64, mined_block: u64) -> Option<u64> {
    head.checked_sub(mined_block)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{Address, B256};
    use futures::stream;
    use tokio_test::{assert_pending, assert_ready, task};

    fn receipt() -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: B256::repeat_byte(0xab),
            block_number: Some(100),
            from: Address::repeat_byte(0x01),
            to: None,
            contract_address: Some(Address::repeat_byte(0xcc)),
            status: true,
            gas_used: 21_000,
        }
    }

    fn confirmations(range: std::ops::RangeInclusive<u64>) -> Vec<Result<Confirmation, Error>> {
        range
            .map(|number| {
                Ok(Confirmation {
                    number,
                    receipt: receipt(),
                })
            })
            .collect()
    }

    #[tokio::test]
    async fn test_resolves_past_threshold() {
        let stream = stream::iter(confirmations(0..=9)).boxed();
        let resolved = await_confirmations(stream, DEFAULT_CONFIRMATIONS)
            .await
            .unwrap();
        assert_eq!(resolved, receipt());
    }

    #[test]
    fn test_stays_pending_at_threshold() {
        let stream = stream::iter(confirmations(0..=8))
            .chain(stream::pending())
            .boxed();
        let mut fut = task::spawn(await_confirmations(stream, DEFAULT_CONFIRMATIONS));
        assert_pending!(fut.poll());
    }

    #[test]
    fn test_error_rejects_after_confirmations() {
        let mut events = confirmations(0..=7);
        events.push(Err(Error::Evm("reverted".to_string())));
        events.extend(confirmations(8..=12));
        let stream = stream::iter(events).boxed();

        let mut fut = task::spawn(await_confirmations(stream, DEFAULT_CONFIRMATIONS));
        let result = assert_ready!(fut.poll());
        assert!(matches!(result, Err(Error::Evm(_))));
    }

    #[tokio::test]
    async fn test_closed_stream_rejects() {
        let stream = stream::iter(confirmations(0..=3)).boxed();
        let result = await_confirmations(stream, DEFAULT_CONFIRMATIONS).await;
        assert!(matches!(result, Err(Error::Confirmation(_))));
    }

    #[tokio::test]
    async fn test_inclusion_resolves_on_first_block() {
        let stream = stream::iter(confirmations(0..=0))
            .chain(stream::pending())
            .boxed();
        assert_eq!(await_inclusion(stream).await.unwrap(), receipt());
    }

    #[tokio::test]
    async fn test_inclusion_rejects_on_error_or_empty_stream() {
        let failing = stream::iter(vec![Err(Error::Evm("reverted".to_string()))]).boxed();
        assert!(matches!(await_inclusion(failing).await, Err(Error::Evm(_))));

        let empty = stream::iter(Vec::new()).boxed();
        assert!(matches!(
            await_inclusion(empty).await,
            Err(Error::Confirmation(_))
        ));
    }

    #[test]
    fn test_eight_blocks_after_inclusion_stay_pending() {
        let events: Vec<_> = (100..=108)
            .filter_map(|head| confirmations_at(head, 100))
            .map(|number| {
                Ok(Confirmation {
                    number,
                    receipt: receipt(),
                })
            })
            .collect();
        let stream = stream::iter(events).chain(stream::pending()).boxed();

        let mut fut = task::spawn(await_confirmations(stream, DEFAULT_CONFIRMATIONS));
        assert_pending!(fut.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let stream = stream::pending::<Result<Confirmation, Error>>().boxed();
        let result =
            await_confirmations_within(stream, DEFAULT_CONFIRMATIONS, Some(Duration::from_secs(30)))
                .await;
        assert!(matches!(result, Err(Error::Confirmation(_))));
    }

    #[test]
    fn test_confirmations_at() {
        assert_eq!(confirmations_at(100, 100), Some(0));
        assert_eq!(confirmations_at(108, 100), Some(8));
        assert_eq!(confirmations_at(109, 100), Some(9));
        assert_eq!(confirmations_at(99, 100), None);
    }
}
